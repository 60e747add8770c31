use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufRead, BufReader},
    iter::zip,
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    alphabet::Alphabets,
    error::{Error, Result},
};

/// Tag modifiers dropped by normalization: citation, headline and title.
const TAG_MODIFIERS: [&str; 3] = ["-NC", "-HL", "-TL"];

/// Layout of a tagged corpus file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorpusFormat {
    /// One `word<TAB>tag` token per line, sentences separated by blank lines.
    #[default]
    Tsv,
    /// One sentence per line of whitespace separated `word/tag` tokens.
    Slash,
}

/// A tagged sentence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl Sequence {
    pub fn push(&mut self, word: String, tag: String) {
        self.words.push(word);
        self.tags.push(tag);
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Fails when `words` and `tags` differ in length.
    pub fn check_lengths(&self) -> Result<()> {
        if self.words.len() != self.tags.len() {
            return Err(Error::LengthMismatch { words: self.words.len(), tags: self.tags.len() });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.tags.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        zip(&self.words, &self.tags).map(|(w, t)| (w.as_str(), t.as_str()))
    }
}

impl<W: Into<String>, T: Into<String>> FromIterator<(W, T)> for Sequence {
    fn from_iter<I: IntoIterator<Item = (W, T)>>(iter: I) -> Self {
        let mut seq = Sequence::default();
        for (w, t) in iter {
            seq.push(w.into(), t.into());
        }
        seq
    }
}

/// Lowercases the word and strips the `-NC`, `-HL` and `-TL` tag modifiers.
///
/// Modifiers are removed in one left-to-right scan of the original tag, so
/// text joined by a removal is kept: `X-H-NCL` becomes `X-HL`.
pub fn normalize(word: &str, tag: &str) -> (String, String) {
    let mut stripped = String::with_capacity(tag.len());
    let mut rest = tag;
    while let Some(c) = rest.chars().next() {
        match TAG_MODIFIERS.iter().find(|m| rest.starts_with(**m)) {
            Some(m) => rest = &rest[m.len()..],
            None => {
                stripped.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    (word.to_lowercase(), stripped)
}

#[derive(Debug, Default, Clone)]
pub struct Dataset {
    pub seqs: Vec<Sequence>,
}

impl From<Vec<Sequence>> for Dataset {
    fn from(seqs: Vec<Sequence>) -> Self {
        Self { seqs }
    }
}

impl TryFrom<File> for Dataset {
    type Error = Error;

    fn try_from(value: File) -> Result<Self> {
        let mut ds = Dataset::default();
        ds.read_file(value, CorpusFormat::Tsv, true)?;
        Ok(ds)
    }
}

impl Dataset {
    pub fn read_file(&mut self, file: File, format: CorpusFormat, normalized: bool) -> Result<()> {
        let lines = BufReader::new(file).lines().collect::<std::io::Result<Vec<_>>>()?;
        self.append_lines(lines.iter().map(String::as_str), format, normalized);
        Ok(())
    }

    pub fn from_lines<'a, I: Iterator<Item = &'a str>>(lines: I, format: CorpusFormat, normalized: bool) -> Self {
        let mut ds = Dataset::default();
        ds.append_lines(lines, format, normalized);
        ds
    }

    fn append_lines<'a, I: Iterator<Item = &'a str>>(&mut self, lines: I, format: CorpusFormat, normalized: bool) {
        let token = |word: &str, tag: &str| {
            if normalized {
                normalize(word, tag)
            } else {
                (word.to_string(), tag.to_string())
            }
        };
        let mut seq = Sequence::default();
        for line in lines {
            let line = line.trim();
            match format {
                CorpusFormat::Tsv => {
                    if line.is_empty() {
                        if !seq.is_empty() {
                            self.seqs.push(std::mem::take(&mut seq));
                        }
                    } else if let Some((word, tag)) = line.split_once('\t') {
                        let (word, tag) = token(word.trim(), tag.trim());
                        seq.push(word, tag);
                    } else {
                        log::warn!("invalid line: {line}");
                    }
                }
                CorpusFormat::Slash => {
                    for tok in line.split_whitespace() {
                        match tok.rsplit_once('/') {
                            Some((word, tag)) if !word.is_empty() && !tag.is_empty() => {
                                let (word, tag) = token(word, tag);
                                seq.push(word, tag);
                            }
                            _ => log::warn!("invalid token: {tok}"),
                        }
                    }
                    if !seq.is_empty() {
                        self.seqs.push(std::mem::take(&mut seq));
                    }
                }
            }
        }
        if !seq.is_empty() {
            self.seqs.push(seq);
        }
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn max_seq_length(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).sum()
    }

    /// Closed tag set and vocabulary over every sentence in the corpus.
    pub fn alphabets(&self) -> Alphabets {
        let mut tags = BTreeSet::new();
        let mut words = BTreeSet::new();
        for (word, tag) in self.seqs.iter().flat_map(Sequence::iter) {
            words.insert(word);
            tags.insert(tag);
        }
        Alphabets::new(tags.into_iter().collect(), words.into_iter().collect())
    }

    /// Splits into a training prefix of `floor(train_fraction * len)` sentences
    /// and the remaining test suffix.
    pub fn split(&self, train_fraction: f64) -> Result<(&[Sequence], &[Sequence])> {
        if !(train_fraction > 0.0 && train_fraction <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "train fraction must be in (0, 1], got {train_fraction}"
            )));
        }
        let limit = ((train_fraction * self.len() as f64) as usize).min(self.len());
        Ok(self.seqs.split_at(limit))
    }
}
