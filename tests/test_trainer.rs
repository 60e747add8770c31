use hmmtagger::{
    hmm::smoothing::SmoothedDistribution, CorpusFormat, Dataset, Error, HmmTrainer, Smoothing,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small Brown-style corpus in the slash format, with a long tail of words.
fn corpus() -> Dataset {
    let dets = ["the", "a", "this", "every"];
    let nouns = ["dog", "cat", "man", "city", "house", "car", "tree", "idea", "river", "child", "book"];
    let verbs = ["runs", "sees", "likes", "walks", "builds", "reads", "finds"];
    let adjs = ["big", "old", "red", "quiet"];
    let mut lines = Vec::new();
    for i in 0..60usize {
        let mut s = format!("{}/AT {}/NN {}/VBZ", dets[i % 4], nouns[i % 11], verbs[i % 7]);
        if i % 3 == 0 {
            s.push_str(&format!(" {}/AT {}/JJ {}/NN", dets[(i + 1) % 4], adjs[i % 4], nouns[(i * 5) % 11]));
        }
        if i % 5 == 0 {
            s.push_str(" ./.");
        }
        lines.push(s);
    }
    lines.push("Fulton/NP-TL County/NN-TL said/VBD ./.".to_string());
    Dataset::from_lines(lines.iter().map(String::as_str), CorpusFormat::Slash, true)
}

fn assert_distribution(d: &SmoothedDistribution) {
    let mut sum = 0.0;
    for o in 0..d.bins() {
        let p = d.prob(o);
        assert!(p > 0.0 && p <= 1.0, "p({o}) = {p}");
        sum += p;
    }
    assert!((sum - 1.0).abs() < 1e-6, "sum = {sum}");
}

#[test]
fn test_distributions_are_proper() {
    init();
    let ds = corpus();
    let (train, _) = ds.split(0.8).unwrap();
    for smoothing in [Smoothing::GoodTuring, Smoothing::Laplace] {
        let model = HmmTrainer::new(ds.alphabets(), smoothing).train(train).unwrap();
        assert_distribution(model.initial());
        model.transitions().iter().for_each(assert_distribution);
        model.emissions().iter().for_each(assert_distribution);
    }
}

#[test]
fn test_normalized_corpus() {
    let ds = corpus();
    let alphabets = ds.alphabets();
    assert!(alphabets.tag_id("NP").is_ok());
    assert!(alphabets.tag_id("NP-TL").is_err());
    assert!(alphabets.word_id("fulton").is_ok());
    assert!(alphabets.word_id("Fulton").is_err());
}

#[test]
fn test_unseen_emission_is_positive() {
    init();
    let ds = corpus();
    let (train, _) = ds.split(0.5).unwrap();
    let model = HmmTrainer::new(ds.alphabets(), Smoothing::GoodTuring).train(train).unwrap();
    // "fulton" only occurs in the held-out last sentence
    let p = model.emission_log_prob("NN", "fulton").unwrap();
    assert!(p.is_finite());
    assert!(p < model.emission_log_prob("NN", "dog").unwrap());
}

#[test]
fn test_training_is_deterministic() {
    init();
    let ds = corpus();
    let (train, _) = ds.split(0.8).unwrap();
    let trainer = HmmTrainer::new(ds.alphabets(), Smoothing::GoodTuring);
    let a = trainer.train(train).unwrap();
    let b = trainer.train(train).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_split() {
    let ds = corpus();
    for fraction in [0.1, 0.5, 0.8, 1.0] {
        let (train, test) = ds.split(fraction).unwrap();
        assert_eq!(train.len(), (fraction * ds.len() as f64).floor() as usize);
        assert_eq!(train.len() + test.len(), ds.len());
        assert_eq!(train.first(), ds.seqs.first());
        if !test.is_empty() {
            assert_eq!(test.last(), ds.seqs.last());
        }
    }
    for fraction in [0.0, -0.5, 1.5, f64::NAN] {
        assert!(matches!(ds.split(fraction), Err(Error::InvalidConfig(_))));
    }
}

#[test]
fn test_insufficient_data() {
    init();
    let ds = corpus();
    let trainer = HmmTrainer::new(ds.alphabets(), Smoothing::GoodTuring);
    assert!(matches!(trainer.train(&[]), Err(Error::InsufficientData(_))));

    let empty = Dataset::default();
    let trainer = HmmTrainer::new(empty.alphabets(), Smoothing::Laplace);
    assert!(matches!(trainer.train(&ds.seqs), Err(Error::InsufficientData(_))));
}
