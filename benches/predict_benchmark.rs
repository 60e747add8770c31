use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmmtagger::{CorpusFormat, Dataset, Evaluator, HmmTrainer, Smoothing};

fn synthetic_corpus(n: usize) -> Dataset {
    let tags = ["AT", "JJ", "NN", "VBZ", "RB", "IN", "CC", "PPS"];
    let lines: Vec<String> = (0..n)
        .map(|i| {
            (0..(5 + i % 30))
                .map(|t| format!("w{}/{}", (i * 13 + t * 29) % 1000, tags[(i + t * 3) % tags.len()]))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    Dataset::from_lines(lines.iter().map(String::as_str), CorpusFormat::Slash, false)
}

fn criterion_benchmark(c: &mut Criterion) {
    let ds = synthetic_corpus(2000);
    let model = HmmTrainer::new(ds.alphabets(), Smoothing::GoodTuring)
        .train(&ds.seqs)
        .expect("failed to train");
    let evaluator = Evaluator::new(&model);
    let words: Vec<&str> = ds.seqs[7].words.iter().map(String::as_str).collect();

    c.bench_function("tag sentence", |b| {
        let mut tagger = model.tagger();
        b.iter(|| tagger.tag(black_box(&words)).unwrap())
    });
    c.bench_function("evaluate corpus", |b| {
        b.iter(|| evaluator.evaluate(black_box(&ds.seqs)).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
