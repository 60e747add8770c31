use std::fmt;

use thiserror::Error;

/// Which closed alphabet a symbol was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Tag,
    Word,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Word => write!(f, "word"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The training partition is empty, or the alphabets do not cover it.
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// A symbol outside the closed tag set or vocabulary reached the model.
    #[error("unknown {kind}: {symbol:?}")]
    UnknownSymbol { kind: SymbolKind, symbol: String },

    #[error("cannot decode an empty sentence")]
    EmptySentence,

    /// A sentence pairs a different number of words and tags.
    #[error("{words} words but {tags} tags")]
    LengthMismatch { words: usize, tags: usize },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
