use std::collections::{BTreeMap, HashMap};

/// Frequency distribution of outcome ids within one context.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FreqDist {
    counts: HashMap<usize, u64>,
    total: u64,
}

impl FreqDist {
    pub fn inc(&mut self, outcome: usize) {
        self.add(outcome, 1);
    }

    pub fn add(&mut self, outcome: usize, count: u64) {
        if count > 0 {
            *self.counts.entry(outcome).or_default() += count;
            self.total += count;
        }
    }

    pub fn get(&self, outcome: usize) -> u64 {
        self.counts.get(&outcome).copied().unwrap_or_default()
    }

    /// Total number of observations.
    pub fn n(&self) -> u64 {
        self.total
    }

    /// Number of distinct observed outcomes.
    pub fn b(&self) -> usize {
        self.counts.len()
    }

    /// Number of outcomes observed exactly `r` times (`r > 0`).
    pub fn nr(&self, r: u64) -> u64 {
        self.counts.values().filter(|&&c| c == r).count() as u64
    }

    /// Non-empty frequency classes `(r, Nr)`, ascending in `r`.
    pub fn r_nr(&self) -> Vec<(u64, u64)> {
        let mut classes = BTreeMap::new();
        for &c in self.counts.values() {
            *classes.entry(c).or_insert(0u64) += 1;
        }
        classes.into_iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts.iter().map(|(&k, &v)| (k, v))
    }

    pub fn merge(&mut self, other: &FreqDist) {
        for (outcome, count) in other.iter() {
            self.add(outcome, count);
        }
    }
}

/// Raw initial, transition and emission counts of a training partition.
///
/// `transitions[prev]` counts the tags following `prev`; `emissions[tag]`
/// counts the words emitted by `tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTable {
    pub initial: FreqDist,
    pub transitions: Vec<FreqDist>,
    pub emissions: Vec<FreqDist>,
}

impl CountTable {
    pub fn new(num_tags: usize) -> Self {
        Self {
            initial: FreqDist::default(),
            transitions: vec![FreqDist::default(); num_tags],
            emissions: vec![FreqDist::default(); num_tags],
        }
    }

    pub fn num_tags(&self) -> usize {
        self.transitions.len()
    }

    /// Counts one sentence given as parallel `(word, tag)` id slices.
    pub fn add_sequence(&mut self, words: &[usize], tags: &[usize]) {
        debug_assert_eq!(words.len(), tags.len());
        let mut prev: Option<usize> = None;
        for (&word, &tag) in words.iter().zip(tags) {
            match prev {
                None => self.initial.inc(tag),
                Some(p) => self.transitions[p].inc(tag),
            }
            self.emissions[tag].inc(word);
            prev = Some(tag);
        }
    }

    /// Sums `other` into `self`; the result does not depend on merge order.
    pub fn merge(mut self, other: CountTable) -> CountTable {
        debug_assert_eq!(self.num_tags(), other.num_tags());
        self.initial.merge(&other.initial);
        for (a, b) in self.transitions.iter_mut().zip(&other.transitions) {
            a.merge(b);
        }
        for (a, b) in self.emissions.iter_mut().zip(&other.emissions) {
            a.merge(b);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freq_of_freqs() {
        let mut fd = FreqDist::default();
        for o in [0, 0, 0, 1, 1, 2, 3, 4] {
            fd.inc(o);
        }
        assert_eq!(fd.n(), 8);
        assert_eq!(fd.b(), 5);
        assert_eq!(fd.nr(1), 3);
        assert_eq!(fd.nr(2), 1);
        assert_eq!(fd.nr(4), 0);
        assert_eq!(fd.r_nr(), vec![(1, 3), (2, 1), (3, 1)]);
    }

    #[test]
    fn count_sequence() {
        let mut table = CountTable::new(2);
        table.add_sequence(&[0, 1, 2], &[0, 1, 1]);
        assert_eq!(table.initial.get(0), 1);
        assert_eq!(table.initial.n(), 1);
        assert_eq!(table.transitions[0].get(1), 1);
        assert_eq!(table.transitions[1].get(1), 1);
        assert_eq!(table.transitions[1].n(), 1);
        assert_eq!(table.emissions[1].n(), 2);
        assert_eq!(table.emissions[0].get(0), 1);
    }

    #[test]
    fn merge_is_order_independent() {
        let sentences: [(&[usize], &[usize]); 3] = [
            (&[0, 1], &[0, 1]),
            (&[2, 2, 0], &[1, 1, 0]),
            (&[1], &[1]),
        ];
        let tables: Vec<CountTable> = sentences
            .iter()
            .map(|(w, t)| {
                let mut table = CountTable::new(2);
                table.add_sequence(w, t);
                table
            })
            .collect();
        let forward = tables.iter().cloned().fold(CountTable::new(2), CountTable::merge);
        let backward = tables.iter().rev().cloned().fold(CountTable::new(2), CountTable::merge);
        assert_eq!(forward, backward);

        let mut single = CountTable::new(2);
        for (w, t) in sentences {
            single.add_sequence(w, t);
        }
        assert_eq!(forward, single);
    }
}
