pub mod alphabet;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod hmm;
pub mod quark;
pub mod report;

pub use alphabet::Alphabets;
pub use config::{Config, Smoothing};
pub use dataset::{CorpusFormat, Dataset, Sequence};
pub use error::{Error, Result};
pub use evaluation::{ConfusionMatrix, Evaluation, Evaluator};
pub use hmm::{model::HmmModel, tagger::{Tagger, ViterbiTagger}, trainer::HmmTrainer};
pub use quark::{Quark, StringTable};
