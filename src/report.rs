use std::io::Write;

use crate::{
    dataset::Sequence,
    error::Result,
    evaluation::{Evaluation, Evaluator},
    hmm::model::HmmModel,
};

/// Writes a readable trace of the test sentences in `[n1, n2)`, then the
/// confusion matrix over those sentences only.
///
/// ```text
/// Test: the/AT dog/NN runs/VBZ
/// HMM : the/AT dog/NN runs/NNS
/// Comparison: [1, 1, 0]
/// Accuracy   : 66.67
/// ```
pub fn write_examples<W: Write>(
    out: &mut W,
    model: &HmmModel,
    test: &[Sequence],
    n1: usize,
    n2: usize,
) -> Result<Evaluation> {
    let end = n2.min(test.len());
    let begin = n1.min(end);
    let evaluator = Evaluator::new(model);
    let alphabets = model.alphabets();
    let mut tagger = model.tagger();
    let mut evaluation = Evaluation::new(model.labels());
    for seq in &test[begin..end] {
        let (words, gold) = evaluator.to_ids(seq)?;
        let prediction = tagger.tag_ids(&words)?;

        let pairs = |tags: &[usize]| {
            seq.words
                .iter()
                .zip(tags)
                .map(|(w, &t)| format!("{}/{}", w, alphabets.tag(t)))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let comparison = gold
            .iter()
            .zip(&prediction)
            .map(|(g, p)| if g == p { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(", ");

        writeln!(out, "Test: {}", pairs(&gold))?;
        writeln!(out, "HMM : {}", pairs(&prediction))?;
        writeln!(out, "Comparison: [{}]", comparison)?;
        let accuracy = evaluation.accumulate(&gold, &prediction);
        writeln!(out, "Accuracy   : {:.2}\n", accuracy * 100.0)?;
    }
    write!(out, "{}", evaluation.confusion())?;
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabets;

    fn model() -> HmmModel {
        let alphabets = Alphabets::new(["N", "V"].into_iter().collect(), ["dog", "fast", "runs"].into_iter().collect());
        HmmModel::from_probs(
            alphabets,
            &[0.6, 0.4],
            &[vec![0.3, 0.7], vec![0.5, 0.5]],
            &[vec![0.8, 0.1, 0.1], vec![0.1, 0.2, 0.7]],
        )
        .unwrap()
    }

    fn sentence(pairs: &[(&str, &str)]) -> Sequence {
        pairs.iter().copied().collect()
    }

    #[test]
    fn trace_one_sentence() {
        let model = model();
        let test = vec![sentence(&[("dog", "N"), ("runs", "N")]), sentence(&[("dog", "N")])];
        let mut out = Vec::new();
        let ev = write_examples(&mut out, &model, &test, 0, 1).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Test: dog/N runs/N");
        assert_eq!(lines[1], "HMM : dog/N runs/V");
        assert_eq!(lines[2], "Comparison: [1, 0]");
        assert_eq!(lines[3], "Accuracy   : 50.00");
        assert!(text.ends_with("(row = reference; col = test)\n"));
        assert_eq!(ev.num_sentences(), 1);
        assert_eq!(ev.num_tokens(), 2);
    }

    #[test]
    fn range_is_clamped() {
        let model = model();
        let test = vec![sentence(&[("fast", "V")])];
        let mut out = Vec::new();
        let ev = write_examples(&mut out, &model, &test, 0, 10).unwrap();
        assert_eq!(ev.num_sentences(), 1);
        let ev = write_examples(&mut Vec::new(), &model, &test, 5, 10).unwrap();
        assert_eq!(ev.num_sentences(), 0);
    }
}
