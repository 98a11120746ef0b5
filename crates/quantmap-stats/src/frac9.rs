//! Nine standard fractiles of a distribution

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cdf_forward::CdfForward;
use crate::cdf_inverse::CdfInverse;

/// Probabilities at which [`Frac9`] evaluates the quantile function
pub const FRAC9_FRACTIONS: [f64; 9] = [0.0, 0.01, 0.10, 0.25, 0.50, 0.75, 0.90, 0.99, 1.0];

/// Table size used when a [`Frac9`] has to build its own inverse CDF
pub const FRAC9_LUT_SIZE: usize = 16384;

/// Data values at the fractiles in [`FRAC9_FRACTIONS`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frac9 {
    values: [f64; 9],
}

impl Frac9 {
    /// All-NaN fractiles
    pub fn null() -> Self {
        Self {
            values: [f64::NAN; 9],
        }
    }

    pub fn from_inverse(cdf_inv: &CdfInverse) -> Self {
        let mut values = [f64::NAN; 9];
        for (value, &frac) in values.iter_mut().zip(FRAC9_FRACTIONS.iter()) {
            *value = cdf_inv.eval(frac);
        }
        Self { values }
    }

    pub fn from_forward(cdf_fwd: &CdfForward) -> Self {
        Self::from_inverse(&CdfInverse::from_cdf_forward(cdf_fwd, FRAC9_LUT_SIZE))
    }

    pub fn is_valid(&self) -> bool {
        self.values.iter().all(|v| !v.is_nan())
    }

    pub fn values(&self) -> &[f64; 9] {
        &self.values
    }

    pub fn min(&self) -> f64 {
        self.values[0]
    }

    pub fn p01(&self) -> f64 {
        self.values[1]
    }

    pub fn p10(&self) -> f64 {
        self.values[2]
    }

    pub fn q1(&self) -> f64 {
        self.values[3]
    }

    pub fn median(&self) -> f64 {
        self.values[4]
    }

    pub fn q3(&self) -> f64 {
        self.values[5]
    }

    pub fn p90(&self) -> f64 {
        self.values[6]
    }

    pub fn p99(&self) -> f64 {
        self.values[7]
    }

    pub fn max(&self) -> f64 {
        self.values[8]
    }

    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3() - self.q1()
    }
}

impl fmt::Display for Frac9 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (frac, value) in FRAC9_FRACTIONS.iter().zip(self.values.iter()) {
            writeln!(f, "{:>6.2}% {:.6e}", frac * 100.0, value)?;
        }
        Ok(())
    }
}
