//! omd-stats: outcome histogram + chi-square goodness-of-fit against a uniform six-face die.
//!
//! The statistic uses proportions rather than counts:
//! `chi2 = Σ_v (p_v - 1/6)^2 / (1/6)` over v in 1..=6, with 5 degrees of freedom.
//! `cdf` is the chi-square CDF at `chi2` (not the survival function).

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use thiserror::Error;

/// Number of outcome categories (die values 1..=6).
pub const CATEGORIES: usize = 6;

/// Degrees of freedom of the uniform goodness-of-fit test.
pub const DEGREES_OF_FREEDOM: f64 = (CATEGORIES - 1) as f64;

/// Expected proportion of each value under the uniform null.
pub const EXPECTED: f64 = 1.0 / CATEGORIES as f64;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("no converged samples: histogram and chi-square are undefined")]
    EmptyConvergence,
    #[error("value {0} outside 1..=6")]
    ValueOutOfRange(u8),
    #[error("chi-square distribution: {0}")]
    Distribution(String),
}

/// Counts of each die value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    counts: [u64; CATEGORIES],
    total: u64,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally 1-based values.
    pub fn from_values(values: &[u8]) -> Result<Self, StatsError> {
        let mut h = Self::new();
        for &v in values {
            h.record(v)?;
        }
        Ok(h)
    }

    pub fn record(&mut self, value: u8) -> Result<(), StatsError> {
        if !(1..=CATEGORIES as u8).contains(&value) {
            return Err(StatsError::ValueOutOfRange(value));
        }
        self.counts[(value - 1) as usize] += 1;
        self.total += 1;
        Ok(())
    }

    pub fn counts(&self) -> [u64; CATEGORIES] {
        self.counts
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Fraction of samples per value (index 0 is value 1).
    pub fn proportions(&self) -> Result<[f64; CATEGORIES], StatsError> {
        if self.total == 0 {
            return Err(StatsError::EmptyConvergence);
        }
        let n = self.total as f64;
        let mut out = [0.0f64; CATEGORIES];
        for (o, &c) in out.iter_mut().zip(self.counts.iter()) {
            *o = c as f64 / n;
        }
        Ok(out)
    }
}

/// Pearson statistic of `proportions` against the uniform distribution.
pub fn chi2_uniform(proportions: &[f64; CATEGORIES]) -> f64 {
    proportions
        .iter()
        .map(|&p| (p - EXPECTED).powi(2) / EXPECTED)
        .sum()
}

/// Chi-square CDF with `df` degrees of freedom.
pub fn chi2_cdf(x: f64, df: f64) -> Result<f64, StatsError> {
    let dist = ChiSquared::new(df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok(dist.cdf(x))
}

/// Histogram, statistic and CDF for one set of outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    pub histogram: [f64; CATEGORIES],
    pub chi2: f64,
    pub cdf: f64,
}

impl GoodnessOfFit {
    pub fn from_histogram(h: &Histogram) -> Result<Self, StatsError> {
        let histogram = h.proportions()?;
        let chi2 = chi2_uniform(&histogram);
        let cdf = chi2_cdf(chi2, DEGREES_OF_FREEDOM)?;
        Ok(Self {
            histogram,
            chi2,
            cdf,
        })
    }

    /// Fails with `EmptyConvergence` on an empty slice.
    pub fn from_values(values: &[u8]) -> Result<Self, StatsError> {
        Self::from_histogram(&Histogram::from_values(values)?)
    }
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
