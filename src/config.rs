use std::{fs::File, io::BufReader, path::Path};

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Estimator applied to each context of the count tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Smoothing {
    /// Simple Good-Turing discounting, Laplace where no curve can be fitted.
    #[default]
    GoodTuring,
    /// Add-one smoothing everywhere.
    Laplace,
}

#[derive(Debug, Clone, PartialEq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// fraction of the corpus (prefix) used for training
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,
    /// smoothing of the emission and transition counts
    #[arg(long, value_enum, default_value_t = Smoothing::GoodTuring)]
    pub smoothing: Smoothing,
    /// first test sentence to trace
    #[arg(long, default_value_t = 0)]
    pub n1: usize,
    /// end (excluded) of the traced test sentences
    #[arg(long, default_value_t = 10)]
    pub n2: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            smoothing: Smoothing::default(),
            n1: 0,
            n2: 10,
        }
    }
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Config = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.train_fraction > 0.0 && self.train_fraction <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "train fraction must be in (0, 1], got {}",
                self.train_fraction
            )));
        }
        if self.n1 > self.n2 {
            return Err(Error::InvalidConfig(format!(
                "trace range is empty: n1 ({}) > n2 ({})",
                self.n1, self.n2
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.train_fraction, 0.8);
        assert_eq!(config.smoothing, Smoothing::GoodTuring);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json() {
        let config: Config = serde_json::from_str(r#"{"smoothing": "laplace", "n2": 3}"#).unwrap();
        assert_eq!(config.smoothing, Smoothing::Laplace);
        assert_eq!(config.n2, 3);
        assert_eq!(config.train_fraction, 0.8);
    }

    #[test]
    fn invalid() {
        for train_fraction in [0.0, 1.01, f64::NAN] {
            let config = Config { train_fraction, ..Default::default() };
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
        let config = Config { n1: 5, n2: 2, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
