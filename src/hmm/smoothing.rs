//! Count to probability estimators.
//!
//! Every estimator here is a pure function of a [`FreqDist`] and the number of
//! possible outcomes (`bins`). The result gives every one of the `bins`
//! outcomes a strictly positive probability, and the probabilities sum to one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::counts::FreqDist;
use crate::{
    config::Smoothing,
    error::{Error, Result},
};

/// Fewest distinct frequency classes the Good-Turing regression is fitted on.
pub const MIN_FREQUENCY_CLASSES: usize = 2;

/// z-score of the confidence interval deciding when the raw Turing estimate
/// is replaced by the smoothed one.
const SWITCH_CONFIDENCE: f64 = 1.96;

/// Smoothed log-probabilities of one context.
///
/// Observed outcomes carry their own value; all unobserved outcomes share one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedDistribution {
    seen: HashMap<usize, f64>,
    /// `None` when every outcome was observed.
    unseen: Option<f64>,
    bins: usize,
    /// `None` for distributions given explicitly rather than estimated.
    estimator: Option<Smoothing>,
}

impl SmoothedDistribution {
    /// Natural-log probability of `outcome`, which must be below `bins`.
    #[inline]
    pub fn log_prob(&self, outcome: usize) -> f64 {
        debug_assert!(outcome < self.bins, "outcome {outcome} out of {} bins", self.bins);
        match self.seen.get(&outcome) {
            Some(&lp) => lp,
            None => self.unseen.unwrap_or(f64::NEG_INFINITY),
        }
    }

    pub fn prob(&self, outcome: usize) -> f64 {
        self.log_prob(outcome).exp()
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Builds a distribution from explicit probabilities, one per outcome.
    pub fn from_probs(probs: &[f64]) -> Result<Self> {
        if probs.is_empty() {
            return Err(Error::InvalidModel("empty distribution".into()));
        }
        if let Some(p) = probs.iter().find(|&&p| !(p > 0.0 && p <= 1.0)) {
            return Err(Error::InvalidModel(format!("probability out of (0, 1]: {p}")));
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::InvalidModel(format!("distribution sums to {sum}")));
        }
        let seen = probs.iter().enumerate().map(|(o, p)| (o, p.ln())).collect();
        Ok(Self { seen, unseen: None, bins: probs.len(), estimator: None })
    }

    /// The estimator actually used, after any fallback.
    pub fn estimator(&self) -> Option<Smoothing> {
        self.estimator
    }

    /// Total probability over all `bins` outcomes.
    pub fn mass(&self) -> f64 {
        let seen: f64 = self.seen.values().map(|lp| lp.exp()).sum();
        let unseen = self
            .unseen
            .map_or(0.0, |lp| lp.exp() * self.bins.saturating_sub(self.seen.len()) as f64);
        seen + unseen
    }

    /// Checks that every one of the `bins` outcomes gets a finite log-probability
    /// and that the probabilities sum to one.
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(Error::InvalidModel("empty distribution".into()));
        }
        if let Some(&o) = self.seen.keys().find(|&&o| o >= self.bins) {
            return Err(Error::InvalidModel(format!("outcome {o} out of {} bins", self.bins)));
        }
        match self.unseen {
            None if self.seen.len() < self.bins => {
                return Err(Error::InvalidModel(format!(
                    "{} of {} outcomes have no probability",
                    self.bins - self.seen.len(),
                    self.bins
                )));
            }
            Some(lp) if !lp.is_finite() => {
                return Err(Error::InvalidModel(format!("unseen log-probability {lp}")));
            }
            _ => {}
        }
        if let Some((o, lp)) = self.seen.iter().find(|(_, lp)| !(lp.is_finite() && **lp <= 0.0)) {
            return Err(Error::InvalidModel(format!("log-probability of outcome {o} is {lp}")));
        }
        let mass = self.mass();
        if (mass - 1.0).abs() > 1e-6 {
            return Err(Error::InvalidModel(format!("distribution sums to {mass}")));
        }
        Ok(())
    }
}

/// Estimates the distribution of `fd` over `bins` outcomes.
///
/// Good-Turing falls back to Laplace when the context has too few frequency
/// classes, or when there are unobserved outcomes but no singletons to take
/// their mass from.
pub fn smooth(fd: &FreqDist, bins: usize, smoothing: Smoothing) -> SmoothedDistribution {
    debug_assert!(bins > 0 && bins >= fd.b());
    match smoothing {
        Smoothing::Laplace => laplace(fd, bins),
        Smoothing::GoodTuring => good_turing(fd, bins).unwrap_or_else(|| {
            log::debug!(
                "good-turing fallback to laplace (N: {}, B: {}, bins: {}, classes: {})",
                fd.n(),
                fd.b(),
                bins,
                fd.r_nr().len()
            );
            laplace(fd, bins)
        }),
    }
}

/// Add-one smoothing: `(c + 1) / (N + bins)`.
pub fn laplace(fd: &FreqDist, bins: usize) -> SmoothedDistribution {
    let denom = (fd.n() as f64 + bins as f64).ln();
    let seen = fd.iter().map(|(o, c)| (o, (c as f64 + 1.0).ln() - denom)).collect();
    let unseen = (fd.b() < bins).then_some(-denom);
    SmoothedDistribution { seen, unseen, bins, estimator: Some(Smoothing::Laplace) }
}

/// Simple Good-Turing (Gale & Sampson). `None` when no proper fit exists.
pub fn good_turing(fd: &FreqDist, bins: usize) -> Option<SmoothedDistribution> {
    let r_nr = fd.r_nr();
    let (intercept, slope) = fit(&r_nr)?;
    if slope >= -1.0 {
        log::debug!("good-turing slope {slope:.4} is not below -1 (N: {}, B: {})", fd.n(), fd.b());
    }
    let n = fd.n() as f64;
    let n1 = fd.nr(1) as f64;
    let unseen_bins = bins - fd.b();
    if unseen_bins > 0 && n1 == 0.0 {
        return None;
    }

    let smoothed_nr = |r: u64| (intercept + slope * (r as f64).ln()).exp();
    let raw_nr: HashMap<u64, f64> = r_nr.iter().map(|&(r, nr)| (r, nr as f64)).collect();
    let switch_at = switch_point(&r_nr, smoothed_nr);

    /* Adjusted count r* of an outcome seen r times, as a share of N. */
    let prob_measure = |r: u64| {
        let (er_1, er) = if r < switch_at {
            (raw_nr[&(r + 1)], raw_nr[&r])
        } else {
            (smoothed_nr(r + 1), smoothed_nr(r))
        };
        (r + 1) as f64 * er_1 / er / n
    };

    let prob_cov: f64 = r_nr.iter().map(|&(r, nr)| nr as f64 * prob_measure(r)).sum();
    let p0 = n1 / n;
    let (renormal, unseen) = if unseen_bins > 0 {
        ((1.0 - p0) / prob_cov, Some((p0 / unseen_bins as f64).ln()))
    } else {
        (1.0 / prob_cov, None)
    };

    let log_probs: HashMap<u64, f64> = r_nr
        .iter()
        .map(|&(r, _)| (r, (prob_measure(r) * renormal).ln()))
        .collect();
    let seen = fd.iter().map(|(o, c)| (o, log_probs[&c])).collect();
    Some(SmoothedDistribution { seen, unseen, bins, estimator: Some(Smoothing::GoodTuring) })
}

/// Least-squares fit of `log Zr = a + b log r`; returns `(a, b)`.
fn fit(r_nr: &[(u64, u64)]) -> Option<(f64, f64)> {
    if r_nr.len() < MIN_FREQUENCY_CLASSES {
        return None;
    }
    let last = r_nr.len() - 1;
    let mut log_r = Vec::with_capacity(r_nr.len());
    let mut log_zr = Vec::with_capacity(r_nr.len());
    for (j, &(r, nr)) in r_nr.iter().enumerate() {
        /* Average Nr over the gap to the neighbouring classes. */
        let i = if j > 0 { r_nr[j - 1].0 } else { 0 };
        let k = if j == last { 2 * r - i } else { r_nr[j + 1].0 };
        let zr = 2.0 * nr as f64 / (k - i) as f64;
        log_r.push((r as f64).ln());
        log_zr.push(zr.ln());
    }
    let m = log_r.len() as f64;
    let x_mean = log_r.iter().sum::<f64>() / m;
    let y_mean = log_zr.iter().sum::<f64>() / m;
    let mut xy_cov = 0.0;
    let mut x_var = 0.0;
    for (x, y) in log_r.iter().zip(&log_zr) {
        xy_cov += (x - x_mean) * (y - y_mean);
        x_var += (x - x_mean) * (x - x_mean);
    }
    if x_var == 0.0 {
        return None;
    }
    let slope = xy_cov / x_var;
    Some((y_mean - slope * x_mean, slope))
}

/// First frequency class from which the smoothed estimate is used.
fn switch_point(r_nr: &[(u64, u64)], smoothed_nr: impl Fn(u64) -> f64) -> u64 {
    for (i, &(r, nr)) in r_nr.iter().enumerate() {
        let next = match r_nr.get(i + 1) {
            Some(&(r_next, nr_next)) if r_next == r + 1 => nr_next as f64,
            _ => return r,
        };
        let nr = nr as f64;
        let r1 = (r + 1) as f64;
        let smooth_r_star = r1 * smoothed_nr(r + 1) / smoothed_nr(r);
        let unsmooth_r_star = r1 * next / nr;
        let std = (r1 * r1 * (next / (nr * nr)) * (1.0 + next / nr)).sqrt();
        if (unsmooth_r_star - smooth_r_star).abs() <= SWITCH_CONFIDENCE * std {
            return r;
        }
    }
    u64::MAX
}
