use std::{fmt::Display, iter::zip};

use rayon::prelude::*;

use crate::{
    dataset::Sequence,
    error::{Error, Result},
    hmm::model::HmmModel,
    quark::Quark,
};

/// Counts of `(gold, predicted)` tag pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    /// [L][L] matrix indexed by [gold][predicted].
    cells: Vec<usize>,
}

impl ConfusionMatrix {
    pub fn new(labels: &Quark) -> Self {
        let labels = labels.as_slice().to_vec();
        let cells = vec![0; labels.len() * labels.len()];
        Self { labels, cells }
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[allow(non_snake_case)]
    #[inline]
    pub fn add(&mut self, gold: usize, predicted: usize) {
        let L = self.num_labels();
        self.cells[L * gold + predicted] += 1;
    }

    pub fn get(&self, gold: usize, predicted: usize) -> usize {
        self.cells[self.num_labels() * gold + predicted]
    }

    pub fn get_by_label(&self, gold: &str, predicted: &str) -> Option<usize> {
        let g = self.labels.iter().position(|l| l == gold)?;
        let p = self.labels.iter().position(|l| l == predicted)?;
        Some(self.get(g, p))
    }

    /// Number of occurrences of `gold` in the reference.
    #[allow(non_snake_case)]
    pub fn row_sum(&self, gold: usize) -> usize {
        let L = self.num_labels();
        self.cells[L * gold..L * (gold + 1)].iter().sum()
    }

    /// Number of predictions of `predicted`.
    pub fn col_sum(&self, predicted: usize) -> usize {
        (0..self.num_labels()).map(|g| self.get(g, predicted)).sum()
    }

    pub fn total(&self) -> usize {
        self.cells.iter().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.num_labels()).map(|l| self.get(l, l)).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    /// Per-cell sum; the result does not depend on merge order.
    pub fn merge(mut self, other: &ConfusionMatrix) -> Self {
        debug_assert_eq!(self.labels, other.labels);
        for (a, b) in self.cells.iter_mut().zip(&other.cells) {
            *a += b;
        }
        self
    }

    /// Labels that occur as gold or predicted tags.
    fn active_labels(&self) -> Vec<usize> {
        (0..self.num_labels())
            .filter(|&l| self.row_sum(l) > 0 || self.col_sum(l) > 0)
            .collect()
    }
}

impl Display for ConfusionMatrix {
    /// Rows are gold tags, columns predicted tags, the diagonal in `<>`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self.active_labels();
        let name_len = active.iter().map(|&l| self.labels[l].chars().count()).max().unwrap_or(1);
        let value_len = self.cells.iter().max().map_or(1, |v| v.to_string().len());
        let rule = format!("{}+{}+", "-".repeat(name_len + 1), "-".repeat((value_len + 2) * active.len()));

        /* Column headers are written vertically, one character per line. */
        for k in 0..name_len {
            write!(f, "{:>name_len$} |", "")?;
            for &l in &active {
                let padded = format!("{:>name_len$}", self.labels[l]);
                let c = padded.chars().nth(k).unwrap_or(' ');
                write!(f, " {c:>value_len$} ")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")?;
        for &g in &active {
            write!(f, "{:>name_len$} |", self.labels[g])?;
            for &p in &active {
                let v = self.get(g, p);
                let s = if v == 0 { ".".to_string() } else { v.to_string() };
                if g == p {
                    write!(f, "<{s:>value_len$}>")?;
                } else {
                    write!(f, " {s:>value_len$} ")?;
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "(row = reference; col = test)")
    }
}

/// Label-wise performance values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabelMeasure {
    /// Number of correct predictions.
    pub num_correct: usize,
    /// Number of occurrences of the label in the gold-standard data.
    pub num_observation: usize,
    /// Number of predictions.
    pub num_prediction: usize,
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimation {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

/// Accumulated tagging performance over a test partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    confusion: ConfusionMatrix,
    /// Accuracy of each sentence, in input order.
    sentence_accuracies: Vec<f64>,
    /// Number of sentences tagged without any error.
    inst_total_correct: usize,
}

impl Evaluation {
    pub fn new(labels: &Quark) -> Self {
        Self {
            confusion: ConfusionMatrix::new(labels),
            sentence_accuracies: Vec::new(),
            inst_total_correct: 0,
        }
    }

    /// Adds one sentence and returns its accuracy.
    pub fn accumulate(&mut self, reference: &[usize], prediction: &[usize]) -> f64 {
        debug_assert_eq!(reference.len(), prediction.len());
        let mut matched = 0;
        for (&r, &p) in zip(reference, prediction) {
            self.confusion.add(r, p);
            if r == p {
                matched += 1;
            }
        }
        if matched == reference.len() {
            self.inst_total_correct += 1;
        }
        let accuracy = ratio(matched, reference.len());
        self.sentence_accuracies.push(accuracy);
        accuracy
    }

    /// Appends `other`, which covers the sentences following those in `self`.
    pub fn merge(mut self, other: Evaluation) -> Self {
        self.confusion = self.confusion.merge(&other.confusion);
        self.sentence_accuracies.extend(other.sentence_accuracies);
        self.inst_total_correct += other.inst_total_correct;
        self
    }

    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    pub fn sentence_accuracies(&self) -> &[f64] {
        &self.sentence_accuracies
    }

    pub fn num_sentences(&self) -> usize {
        self.sentence_accuracies.len()
    }

    pub fn num_tokens(&self) -> usize {
        self.confusion.total()
    }

    pub fn num_correct(&self) -> usize {
        self.confusion.correct()
    }

    /// Correct positions over all positions of all sentences.
    pub fn accuracy(&self) -> f64 {
        self.confusion.accuracy()
    }

    /// Share of sentences tagged without any error.
    pub fn sequence_accuracy(&self) -> f64 {
        ratio(self.inst_total_correct, self.num_sentences())
    }

    pub fn label_measure(&self, label: usize) -> LabelMeasure {
        let num_correct = self.confusion.get(label, label);
        let num_observation = self.confusion.row_sum(label);
        let num_prediction = self.confusion.col_sum(label);
        let precision = ratio(num_correct, num_prediction);
        let recall = ratio(num_correct, num_observation);
        let fmeasure = if precision + recall > 0.0 {
            precision * recall * 2.0 / (precision + recall)
        } else {
            0.0
        };
        LabelMeasure { num_correct, num_observation, num_prediction, precision, recall, fmeasure }
    }

    /// Macro-averaged precision, recall and F1 over labels present in the reference.
    pub fn macro_average(&self) -> Estimation {
        let measures: Vec<LabelMeasure> = (0..self.confusion.num_labels())
            .map(|l| self.label_measure(l))
            .filter(|m| m.num_observation > 0)
            .collect();
        let n = measures.len().max(1) as f64;
        Estimation {
            precision: measures.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: measures.iter().map(|m| m.recall).sum::<f64>() / n,
            fmeasure: measures.iter().map(|m| m.fmeasure).sum::<f64>() / n,
        }
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance by label (#match, #model, #ref) (precision, recall, F1):")?;
        for (l, label) in self.confusion.labels().iter().enumerate() {
            let lev = self.label_measure(l);
            if lev.num_observation == 0 && lev.num_prediction == 0 {
                continue;
            }
            if lev.num_observation == 0 {
                writeln!(f, "\t{}: ({}, {}, {}) (******, ******, ******)", label, lev.num_correct, lev.num_prediction, lev.num_observation)?;
            } else {
                writeln!(f, "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})", label, lev.num_correct, lev.num_prediction, lev.num_observation,
                    lev.precision, lev.recall, lev.fmeasure
                )?;
            }
        }
        let est = self.macro_average();
        writeln!(f, "Macro-average precision, recall, F1: ({:.4}, {:.4}, {:.4})", est.precision, est.recall, est.fmeasure)?;
        writeln!(f, "Item accuracy: {}/{} => {:.4}", self.num_correct(), self.num_tokens(), self.accuracy())?;
        writeln!(f, "Sequence accuracy: {}/{} => {:.4}", self.inst_total_correct, self.num_sentences(), self.sequence_accuracy())
    }
}

/// Decodes gold-tagged sentences with a model and scores the predictions.
pub struct Evaluator<'a> {
    model: &'a HmmModel,
}

impl<'a> Evaluator<'a> {
    pub fn new(model: &'a HmmModel) -> Self {
        Self { model }
    }

    /// Strips the gold tags, decodes every sentence and compares.
    ///
    /// Sentences are decoded on the rayon pool, one tagger per worker; the
    /// per-sentence accuracies keep the order of `test`.
    pub fn evaluate(&self, test: &[Sequence]) -> Result<Evaluation> {
        let labels = self.model.labels();
        test.par_iter()
            .map_init(
                || self.model.tagger(),
                |tagger, seq| -> Result<(Vec<usize>, Vec<usize>)> {
                    let (words, gold) = self.to_ids(seq)?;
                    let prediction = tagger.tag_ids(&words)?;
                    Ok((gold, prediction))
                },
            )
            .try_fold(
                || Evaluation::new(labels),
                |mut ev, item| -> Result<Evaluation> {
                    let (gold, prediction) = item?;
                    ev.accumulate(&gold, &prediction);
                    Ok(ev)
                },
            )
            .try_reduce(|| Evaluation::new(labels), |a, b| Ok(a.merge(b)))
    }

    pub(crate) fn to_ids(&self, seq: &Sequence) -> Result<(Vec<usize>, Vec<usize>)> {
        if seq.is_empty() {
            return Err(Error::EmptySentence);
        }
        seq.check_lengths()?;
        let alphabets = self.model.alphabets();
        let words = seq.words.iter().map(|w| alphabets.word_id(w)).collect::<Result<Vec<_>>>()?;
        let tags = seq.tags.iter().map(|t| alphabets.tag_id(t)).collect::<Result<Vec<_>>>()?;
        Ok((words, tags))
    }
}

fn ratio(a: usize, b: usize) -> f64 {
    if b > 0 {
        a as f64 / b as f64
    } else {
        0.0
    }
}
