use std::{fs::File, io::stdout, path::PathBuf, time::Instant};

use clap::Parser;
use hmmtagger::{report, Config, CorpusFormat, Dataset, Evaluator, HmmTrainer, Result};

/// Train a first-order HMM tagger on the prefix of a tagged corpus (FILE)
/// and evaluate it on the remaining sentences
#[derive(Debug, Parser)]
#[command(version)]
struct Argv {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(flatten)]
    config: Config,
    /// read the settings from a JSON file instead of the flags above
    #[arg(short, long, value_name = "CONFIG")]
    config_file: Option<PathBuf>,
    /// layout of the corpus files
    #[arg(short, long, value_enum, default_value_t = CorpusFormat::Tsv)]
    format: CorpusFormat,
    /// keep words and tags as they appear in the corpus
    #[arg(long)]
    no_normalize: bool,
    /// store the trained model to a file (MODEL)
    #[arg(short, long, value_name = "MODEL")]
    model: Option<PathBuf>,
    #[arg(required = true, value_name = "FILE")]
    datasets: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let argv = Argv::parse();
    let level = match argv.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("argv: {:?}", argv);

    let config = match &argv.config_file {
        Some(path) => Config::from_path(path)?,
        None => {
            argv.config.validate()?;
            argv.config.clone()
        }
    };

    let begin = Instant::now();
    let mut ds = Dataset::default();
    for fpath in &argv.datasets {
        ds.read_file(File::open(fpath)?, argv.format, !argv.no_normalize)?;
    }
    log::info!(
        "read {} sentences, {} tokens (max length: {}), time cost: {:?}",
        ds.len(),
        ds.total_items(),
        ds.max_seq_length(),
        begin.elapsed()
    );

    let alphabets = ds.alphabets();
    let (train, test) = ds.split(config.train_fraction)?;
    log::info!("train: {} sentences, test: {} sentences", train.len(), test.len());

    let model = HmmTrainer::new(alphabets, config.smoothing).train(train)?;
    if let Some(path) = &argv.model {
        model.save(path)?;
        log::info!("model stored to {}", path.display());
    }

    let begin = Instant::now();
    let evaluation = Evaluator::new(&model).evaluate(test)?;
    log::info!("evaluation time cost: {:?}", begin.elapsed());
    println!("accuracy over {} tokens: {:.4}", evaluation.num_tokens(), evaluation.accuracy());
    println!("{}", evaluation);

    report::write_examples(&mut stdout().lock(), &model, test, config.n1, config.n2)?;
    Ok(())
}
