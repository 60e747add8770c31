use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::{smoothing::SmoothedDistribution, tagger::ViterbiTagger};
use crate::{
    alphabet::Alphabets,
    error::{Error, Result},
    quark::Quark,
};

/// A trained first-order HMM, all probabilities in natural-log space.
///
/// `transitions[i]` is the distribution of the tag following tag `i`,
/// `emissions[i]` the distribution of the words emitted by tag `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmModel {
    alphabets: Alphabets,
    initial: SmoothedDistribution,
    transitions: Vec<SmoothedDistribution>,
    emissions: Vec<SmoothedDistribution>,
}

impl HmmModel {
    pub(crate) fn new(
        alphabets: Alphabets,
        initial: SmoothedDistribution,
        transitions: Vec<SmoothedDistribution>,
        emissions: Vec<SmoothedDistribution>,
    ) -> Self {
        debug_assert_eq!(transitions.len(), alphabets.num_tags());
        debug_assert_eq!(emissions.len(), alphabets.num_tags());
        Self { alphabets, initial, transitions, emissions }
    }

    /// Builds a model from explicit probabilities indexed by alphabet ids:
    /// `initial[t]`, `transitions[from][to]` and `emissions[tag][word]`.
    pub fn from_probs(
        alphabets: Alphabets,
        initial: &[f64],
        transitions: &[Vec<f64>],
        emissions: &[Vec<f64>],
    ) -> Result<Self> {
        let model = Self {
            initial: SmoothedDistribution::from_probs(initial)?,
            transitions: transitions
                .iter()
                .map(|p| SmoothedDistribution::from_probs(p))
                .collect::<Result<_>>()?,
            emissions: emissions
                .iter()
                .map(|p| SmoothedDistribution::from_probs(p))
                .collect::<Result<_>>()?,
            alphabets,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model: HmmModel = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        model.validate()?;
        Ok(model)
    }

    /// Checks that every distribution covers the alphabet it is defined over
    /// with finite log-probabilities summing to one.
    fn validate(&self) -> Result<()> {
        let (l, v) = (self.num_labels(), self.num_words());
        if l == 0 || v == 0 {
            return Err(Error::InvalidModel("empty tag set or vocabulary".into()));
        }
        let shape_ok = self.initial.bins() == l
            && self.transitions.len() == l
            && self.emissions.len() == l
            && self.transitions.iter().all(|d| d.bins() == l)
            && self.emissions.iter().all(|d| d.bins() == v);
        if !shape_ok {
            return Err(Error::InvalidModel(format!(
                "distributions do not match {l} tags and {v} words"
            )));
        }
        std::iter::once(&self.initial)
            .chain(&self.transitions)
            .chain(&self.emissions)
            .try_for_each(SmoothedDistribution::validate)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn tagger(&self) -> ViterbiTagger<'_> {
        ViterbiTagger::new(self)
    }

    pub fn alphabets(&self) -> &Alphabets {
        &self.alphabets
    }

    pub fn labels(&self) -> &Quark {
        &self.alphabets.tags
    }

    pub fn num_labels(&self) -> usize {
        self.alphabets.num_tags()
    }

    pub fn num_words(&self) -> usize {
        self.alphabets.num_words()
    }

    pub fn initial_log_prob(&self, tag: &str) -> Result<f64> {
        Ok(self.initial_score(self.alphabets.tag_id(tag)?))
    }

    pub fn transition_log_prob(&self, from: &str, to: &str) -> Result<f64> {
        let from = self.alphabets.tag_id(from)?;
        let to = self.alphabets.tag_id(to)?;
        Ok(self.transition_score(from, to))
    }

    pub fn emission_log_prob(&self, tag: &str, word: &str) -> Result<f64> {
        let tag = self.alphabets.tag_id(tag)?;
        let word = self.alphabets.word_id(word)?;
        Ok(self.emission_score(tag, word))
    }

    #[inline]
    pub(crate) fn initial_score(&self, tag: usize) -> f64 {
        self.initial.log_prob(tag)
    }

    #[inline]
    pub(crate) fn transition_score(&self, from: usize, to: usize) -> f64 {
        self.transitions[from].log_prob(to)
    }

    #[inline]
    pub(crate) fn emission_score(&self, tag: usize, word: usize) -> f64 {
        self.emissions[tag].log_prob(word)
    }

    pub fn initial(&self) -> &SmoothedDistribution {
        &self.initial
    }

    pub fn transitions(&self) -> &[SmoothedDistribution] {
        &self.transitions
    }

    pub fn emissions(&self) -> &[SmoothedDistribution] {
        &self.emissions
    }
}
