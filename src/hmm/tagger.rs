use super::{context::ViterbiContext, model::HmmModel};
use crate::error::{Error, Result, SymbolKind};

/// Decoding over word and tag ids of one model.
pub trait Tagger {
    /// Sets the sentence to decode, given as word ids.
    fn set_seq(&mut self, words: &[usize]) -> Result<()>;
    /// Number of items in the current sentence.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Writes the best tag ids into `labels` and returns the joint log-probability.
    fn viterbi(&mut self, labels: &mut [usize]) -> f64;
    /// Joint log-probability of the current sentence with the given tag ids.
    fn score(&self, labels: &[usize]) -> f64;
}

/// Viterbi decoder reading a shared, immutable [`HmmModel`].
///
/// A tagger owns its trellis, so each decoding thread needs its own tagger.
pub struct ViterbiTagger<'a> {
    model: &'a HmmModel,
    ctx: ViterbiContext,
}

impl<'a> ViterbiTagger<'a> {
    pub fn new(model: &'a HmmModel) -> Self {
        let num_labels = model.num_labels();
        let mut ctx = ViterbiContext::new(num_labels, 0);
        /* Initial and transition scores do not depend on the sentence. */
        for i in 0..num_labels {
            ctx.initial[i] = model.initial_score(i);
            for j in 0..num_labels {
                ctx.trans[num_labels * i + j] = model.transition_score(i, j);
            }
        }
        Self { model, ctx }
    }

    pub fn model(&self) -> &'a HmmModel {
        self.model
    }

    /// Tags a sentence of words from the model vocabulary.
    pub fn tag<S: AsRef<str>>(&mut self, words: &[S]) -> Result<Vec<String>> {
        let ids = self.word_ids(words)?;
        let labels = self.tag_ids(&ids)?;
        let alphabets = self.model.alphabets();
        Ok(labels.into_iter().map(|l| alphabets.tag(l).to_string()).collect())
    }

    pub fn tag_ids(&mut self, words: &[usize]) -> Result<Vec<usize>> {
        self.set_seq(words)?;
        let mut labels = vec![0; words.len()];
        self.viterbi(&mut labels);
        Ok(labels)
    }

    /// Joint log-probability of `words` tagged with `tags`.
    pub fn score_tags<S: AsRef<str>, U: AsRef<str>>(&mut self, words: &[S], tags: &[U]) -> Result<f64> {
        if words.len() != tags.len() {
            return Err(Error::LengthMismatch { words: words.len(), tags: tags.len() });
        }
        let labels = tags
            .iter()
            .map(|t| self.model.alphabets().tag_id(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let ids = self.word_ids(words)?;
        self.set_seq(&ids)?;
        Ok(self.score(&labels))
    }

    fn word_ids<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<usize>> {
        let alphabets = self.model.alphabets();
        words.iter().map(|w| alphabets.word_id(w.as_ref())).collect()
    }
}

impl Tagger for ViterbiTagger<'_> {
    fn set_seq(&mut self, words: &[usize]) -> Result<()> {
        if words.is_empty() {
            return Err(Error::EmptySentence);
        }
        if let Some(&w) = words.iter().find(|&&w| w >= self.model.num_words()) {
            return Err(Error::UnknownSymbol { kind: SymbolKind::Word, symbol: format!("#{w}") });
        }
        let num_labels = self.ctx.num_labels;
        self.ctx.set_num_items(words.len());
        /* Loop over the items in the sentence. */
        for (t, &w) in words.iter().enumerate() {
            for l in 0..num_labels {
                self.ctx.state[num_labels * t + l] = self.model.emission_score(l, w);
            }
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.ctx.num_items()
    }

    fn viterbi(&mut self, labels: &mut [usize]) -> f64 {
        self.ctx.viterbi(labels)
    }

    fn score(&self, labels: &[usize]) -> f64 {
        self.ctx.path_score(labels)
    }
}
