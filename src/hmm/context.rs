#[derive(Debug, Default)]
pub(crate) struct ViterbiContext {
    /// The total number of distinct labels (L).
    pub num_labels: usize,

    /// The number of items (T) in the sentence.
    num_items: usize,

    /// The number of items the matrices are currently allocated for.
    cap_items: usize,

    /// Initial scores.
    /// This is a [L] vector whose element [l] is log P(l) at the first item.
    pub initial: Vec<f64>,

    /// State scores.
    /// This is a [T][L] matrix whose element [t][l] is the log-probability
    /// of label #l emitting item #t.
    pub state: Vec<f64>,

    /// Transition scores.
    /// This is a [L][L] matrix whose element [i][j] is the log-probability
    /// of label #j following label #i.
    pub trans: Vec<f64>,

    /// Best path scores.
    /// This is a [T][L] matrix whose element [t][l] is the score of the best
    /// path starting at BOS and arriving at (t, l).
    score: Vec<f64>,

    /// Backward edges.
    /// This is a [T][L] matrix whose element [t][j] is the label #i that
    /// yields the maximum score to arrive at (t, j).
    backward_edge: Vec<usize>,
}

impl ViterbiContext {
    #[allow(non_snake_case)]
    pub fn new(L: usize, T: usize) -> Self {
        let mut this = Self {
            num_labels: L,
            initial: vec![0.0; L],
            trans: vec![0.0; L * L],
            ..Default::default()
        };
        this.set_num_items(T);
        this.num_items = 0;
        this
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    #[allow(non_snake_case)]
    pub fn set_num_items(&mut self, T: usize) {
        let L = self.num_labels;
        self.num_items = T;
        if self.cap_items < T {
            self.state.resize(T * L, 0.0);
            self.score.resize(T * L, 0.0);
            self.backward_edge.resize(T * L, 0);
            self.cap_items = T;
        }
    }

    #[inline]
    fn at(&self, t: usize, l: usize) -> usize {
        self.num_labels * t + l
    }

    /// Fills `labels` with the best path and returns its score.
    ///
    /// Labels are scanned in ascending order and only a strictly greater score
    /// replaces the best one, so ties go to the label with the lowest id.
    #[allow(non_snake_case)]
    pub fn viterbi(&mut self, labels: &mut [usize]) -> f64 {
        let T = self.num_items;
        let L = self.num_labels;
        debug_assert!(T > 0 && labels.len() == T);

        /* Compute the scores at (0, *). */
        for j in 0..L {
            let at = self.at(0, j);
            self.score[at] = self.initial[j] + self.state[at];
        }

        /* Compute the scores at (t, *). */
        for t in 1..T {
            for j in 0..L {
                let mut max_score = f64::NEG_INFINITY;
                let mut argmax_score = 0;
                for i in 0..L {
                    /* Transit from (t-1, i) to (t, j). */
                    let score = self.score[self.at(t - 1, i)] + self.trans[L * i + j];
                    if max_score < score {
                        max_score = score;
                        argmax_score = i;
                    }
                }
                /* Backward link (#t, #j) -> (#t-1, #i). */
                let at = self.at(t, j);
                self.backward_edge[at] = argmax_score;
                /* Add the state score on (t, j). */
                self.score[at] = max_score + self.state[at];
            }
        }

        /* Find the node (#T-1, #i) that reaches EOS with the maximum score. */
        let mut max_score = f64::NEG_INFINITY;
        labels[T - 1] = 0;
        for i in 0..L {
            let last = self.score[self.at(T - 1, i)];
            if max_score < last {
                max_score = last;
                labels[T - 1] = i;
            }
        }

        /* Tag labels by tracing the backward links. */
        for t in (0..T - 1).rev() {
            labels[t] = self.backward_edge[self.at(t + 1, labels[t + 1])];
        }
        max_score
    }

    /// Score of a given label path over the current items.
    #[allow(non_snake_case)]
    pub fn path_score(&self, labels: &[usize]) -> f64 {
        let T = self.num_items;
        debug_assert!(T > 0 && labels.len() == T);

        /* Stay at (0, labels[0]). */
        let mut i = labels[0];
        let mut r = self.initial[i] + self.state[self.at(0, i)];

        for t in 1..T {
            let j = labels[t];
            /* Transit from (t-1, i) to (t, j). */
            r += self.trans[self.num_labels * i + j];
            r += self.state[self.at(t, j)];
            i = j;
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init() {
        let ctx = ViterbiContext::new(9, 12);
        assert_eq!(ctx.num_items, 0);
        assert_eq!(ctx.cap_items, 12);
        assert_eq!(ctx.trans.len(), 81);
    }

    #[test]
    fn grow_keeps_capacity() {
        let mut ctx = ViterbiContext::new(3, 4);
        ctx.set_num_items(10);
        assert_eq!(ctx.cap_items, 10);
        assert_eq!(ctx.state.len(), 30);
        ctx.set_num_items(2);
        assert_eq!(ctx.cap_items, 10);
        assert_eq!(ctx.num_items(), 2);
    }

    #[test]
    fn ties_prefer_lowest_label() {
        let mut ctx = ViterbiContext::new(3, 3);
        ctx.set_num_items(3);
        let mut labels = vec![usize::MAX; 3];
        let score = ctx.viterbi(&mut labels);
        assert_eq!(labels, vec![0, 0, 0]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn best_path_matches_path_score() {
        let mut ctx = ViterbiContext::new(2, 2);
        ctx.set_num_items(2);
        ctx.initial.copy_from_slice(&[0.6f64.ln(), 0.4f64.ln()]);
        ctx.trans.copy_from_slice(&[0.3f64.ln(), 0.7f64.ln(), 0.5f64.ln(), 0.5f64.ln()]);
        ctx.state.copy_from_slice(&[0.9f64.ln(), 0.1f64.ln(), 0.2f64.ln(), 0.8f64.ln()]);
        let mut labels = vec![0; 2];
        let score = ctx.viterbi(&mut labels);
        assert_eq!(labels, vec![0, 1]);
        assert!((score - ctx.path_score(&labels)).abs() < 1e-12);
        assert!((score - (0.6f64 * 0.9 * 0.7 * 0.8).ln()).abs() < 1e-12);
    }
}
