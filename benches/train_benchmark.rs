use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmmtagger::{CorpusFormat, Dataset, HmmTrainer, Smoothing};

/// Synthetic slash-format corpus of `n` sentences over a few hundred words.
fn synthetic_corpus(n: usize) -> Dataset {
    let tags = ["AT", "JJ", "NN", "VBZ", "RB", "IN"];
    let lines: Vec<String> = (0..n)
        .map(|i| {
            (0..(5 + i % 20))
                .map(|t| {
                    let tag = tags[(i + t * 7) % tags.len()];
                    let word = format!("w{}", (i * 31 + t * 17) % 400);
                    format!("{word}/{tag}")
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    Dataset::from_lines(lines.iter().map(String::as_str), CorpusFormat::Slash, false)
}

fn criterion_benchmark(c: &mut Criterion) {
    let ds = synthetic_corpus(5000);
    let alphabets = ds.alphabets();
    let mut group = c.benchmark_group("train");
    for smoothing in [Smoothing::GoodTuring, Smoothing::Laplace] {
        let trainer = HmmTrainer::new(alphabets.clone(), smoothing);
        group.bench_function(format!("{smoothing:?}"), |b| {
            b.iter(|| trainer.train(black_box(&ds.seqs)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
