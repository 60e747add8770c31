use std::time::Instant;

use rayon::prelude::*;

use super::{
    counts::CountTable,
    model::HmmModel,
    smoothing::{smooth, SmoothedDistribution},
};
use crate::{
    alphabet::Alphabets,
    config::Smoothing,
    dataset::Sequence,
    error::{Error, Result, SymbolKind},
    quark::StringTable,
};

/// Supervised estimator of [`HmmModel`]s over fixed alphabets.
#[derive(Debug, Clone)]
pub struct HmmTrainer {
    alphabets: Alphabets,
    smoothing: Smoothing,
}

impl HmmTrainer {
    pub fn new(alphabets: Alphabets, smoothing: Smoothing) -> Self {
        Self { alphabets, smoothing }
    }

    pub fn alphabets(&self) -> &Alphabets {
        &self.alphabets
    }

    pub fn train(&self, data: &[Sequence]) -> Result<HmmModel> {
        let counts = self.count(data)?;
        Ok(self.estimate(&counts))
    }

    /// Counts initial tags, tag bigrams and tag/word pairs in one pass.
    ///
    /// Sentences are counted on the rayon pool and the partial tables summed.
    #[allow(non_snake_case)]
    pub fn count(&self, data: &[Sequence]) -> Result<CountTable> {
        let L = self.alphabets.num_tags();
        if data.is_empty() {
            return Err(Error::InsufficientData("empty training partition".into()));
        }
        if L == 0 || self.alphabets.num_words() == 0 {
            return Err(Error::InsufficientData("empty tag set or vocabulary".into()));
        }
        let begin = Instant::now();
        let counts = data
            .par_iter()
            .try_fold(
                || CountTable::new(L),
                |mut table, seq| -> Result<CountTable> {
                    let (words, tags) = self.to_ids(seq)?;
                    table.add_sequence(&words, &tags);
                    Ok(table)
                },
            )
            .try_reduce(|| CountTable::new(L), |a, b| Ok(a.merge(b)))?;
        if counts.initial.n() == 0 {
            return Err(Error::InsufficientData("training partition has no tokens".into()));
        }
        log::info!(
            "counted {} sentences (L: {}, V: {}), time cost: {:?}",
            data.len(),
            L,
            self.alphabets.num_words(),
            begin.elapsed()
        );
        Ok(counts)
    }

    /// Smooths every context of `counts` into a model.
    #[allow(non_snake_case)]
    pub fn estimate(&self, counts: &CountTable) -> HmmModel {
        let L = self.alphabets.num_tags();
        let V = self.alphabets.num_words();
        let begin = Instant::now();
        let initial = smooth(&counts.initial, L, self.smoothing);
        let transitions: Vec<SmoothedDistribution> = counts
            .transitions
            .par_iter()
            .map(|fd| smooth(fd, L, self.smoothing))
            .collect();
        let emissions: Vec<SmoothedDistribution> = counts
            .emissions
            .par_iter()
            .map(|fd| smooth(fd, V, self.smoothing))
            .collect();
        if self.smoothing == Smoothing::GoodTuring {
            let fallbacks = std::iter::once(&initial)
                .chain(&transitions)
                .chain(&emissions)
                .filter(|d| d.estimator() == Some(Smoothing::Laplace))
                .count();
            log::info!("laplace fallback in {} of {} contexts", fallbacks, 1 + 2 * L);
        }
        log::info!("estimation ({:?}), time cost: {:?}", self.smoothing, begin.elapsed());
        HmmModel::new(self.alphabets.clone(), initial, transitions, emissions)
    }

    fn to_ids(&self, seq: &Sequence) -> Result<(Vec<usize>, Vec<usize>)> {
        seq.check_lengths()?;
        let words = seq
            .words
            .iter()
            .map(|w| lookup(&self.alphabets.words, w, SymbolKind::Word))
            .collect::<Result<Vec<_>>>()?;
        let tags = seq
            .tags
            .iter()
            .map(|t| lookup(&self.alphabets.tags, t, SymbolKind::Tag))
            .collect::<Result<Vec<_>>>()?;
        Ok((words, tags))
    }
}

fn lookup(table: &impl StringTable, symbol: &str, kind: SymbolKind) -> Result<usize> {
    table.to_id(symbol).ok_or_else(|| {
        Error::InsufficientData(format!("{kind} {symbol:?} is not covered by the alphabet"))
    })
}
