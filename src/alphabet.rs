use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result, SymbolKind},
    quark::{Quark, StringTable},
};

/// The closed tag set and vocabulary shared by training and decoding.
///
/// Built once over the whole corpus, so both partitions of a split see the
/// same symbols.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabets {
    pub tags: Quark,
    pub words: Quark,
}

impl Alphabets {
    pub fn new(tags: Quark, words: Quark) -> Self {
        Self { tags, words }
    }

    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn tag_id(&self, tag: &str) -> Result<usize> {
        self.tags.to_id(tag).ok_or_else(|| Error::UnknownSymbol {
            kind: SymbolKind::Tag,
            symbol: tag.to_string(),
        })
    }

    pub fn word_id(&self, word: &str) -> Result<usize> {
        self.words.to_id(word).ok_or_else(|| Error::UnknownSymbol {
            kind: SymbolKind::Word,
            symbol: word.to_string(),
        })
    }

    /// Panics on an id outside the tag set; ids only come from this alphabet.
    pub fn tag(&self, id: usize) -> &str {
        &self.tags.as_slice()[id]
    }
}
