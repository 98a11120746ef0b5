//! Forward cumulative distribution functions over a partitioned domain
//!
//! A [`CdfForward`] holds `bins + 1` cumulative fractions sampled at the
//! bin edges of a [`Partition`] and evaluates the CDF by linear
//! interpolation between adjacent edges.
//!
//! # Invariants
//!
//! - `frac_values[0] == 0` and `frac_values[last] == 1` exactly
//! - `frac_values` is non-decreasing; flat steps only where a bin is empty
//!
//! An invalid data range produces an invalid CDF (see [`CdfForward::is_valid`]).
//! Empty or all-zero frequencies produce a valid degenerate CDF that jumps
//! from 0 to 1 immediately above the lower bound.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::histogram::Histogram;
use crate::partition::{Partition, Span};
use crate::sample::{is_valid_index, Sample};

/// Piecewise-linear CDF sampled at the bin edges of a partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdfForward {
    frac_values: Vec<f64>,
    data_part: Partition,
    /// Set for the empty-frequency case: all mass sits at `min`
    degenerate: bool,
}

impl CdfForward {
    /// The invalid CDF
    pub fn null() -> Self {
        Self {
            frac_values: Vec::new(),
            data_part: Partition::null(),
            degenerate: false,
        }
    }

    /// Build from per-bin frequencies spread evenly over `data_range`
    ///
    /// Negative and non-finite frequencies count as zero.
    pub fn from_freqs<T: Sample>(freqs: &[T], data_range: Span) -> Self {
        if !data_range.is_valid() {
            return Self::null();
        }

        let weights: Vec<f64> = freqs
            .iter()
            .map(|f| {
                let w = f.to_f64();
                if w.is_finite() && w > 0.0 {
                    w
                } else {
                    0.0
                }
            })
            .collect();

        let sum: f64 = weights.iter().sum();
        if weights.is_empty() || !(sum > 0.0) || !sum.is_finite() {
            return Self {
                frac_values: vec![0.0, 1.0],
                data_part: Partition::new(data_range, 1),
                degenerate: true,
            };
        }

        // Partial sums stay in frequency units and are divided once, so
        // integer counts give correctly rounded fractions.
        let mut frac_values = Vec::with_capacity(weights.len() + 1);
        let mut running = 0.0;
        frac_values.push(0.0);
        for w in &weights {
            running += w;
            frac_values.push((running / sum).clamp(0.0, 1.0));
        }
        if let Some(last) = frac_values.last_mut() {
            *last = 1.0;
        }

        debug_assert!(Self::is_valid_cdf(&frac_values));

        Self {
            frac_values,
            data_part: Partition::new(data_range, weights.len()),
            degenerate: false,
        }
    }

    /// Histogram `samples` into `data_part` and build from the counts
    pub fn from_samps<T: Sample>(samples: &[T], data_part: Partition) -> Self {
        if !data_part.is_valid() {
            return Self::null();
        }
        let hist = Histogram::from_samples(samples, data_part);
        Self::from_histogram(&hist)
    }

    /// Build from an existing histogram
    pub fn from_histogram(hist: &Histogram) -> Self {
        Self::from_freqs(hist.counts(), hist.partition().range())
    }

    /// Check the CDF invariants on a raw fraction table
    ///
    /// Non-empty, starts at exactly 0, ends at exactly 1, never decreases.
    pub fn is_valid_cdf(values: &[f64]) -> bool {
        match (values.first(), values.last()) {
            (Some(&first), Some(&last)) => {
                first == 0.0 && last == 1.0 && values.windows(2).all(|w| w[0] <= w[1])
            }
            _ => false,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.frac_values.is_empty() && self.data_part.is_valid()
    }

    /// Whether this is the zero-mass CDF built from empty frequencies
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Cumulative probability at `value`
    ///
    /// Returns NaN outside `[min, max]`. Both end points are inside the
    /// domain: `min` maps to 0 and `max` maps to 1.
    pub fn eval(&self, value: f64) -> f64 {
        if !self.is_valid() || !self.data_range().contains(value) {
            return f64::NAN;
        }
        if value == self.data_part.max() {
            return 1.0;
        }
        if self.degenerate {
            return if value == self.data_part.min() { 0.0 } else { 1.0 };
        }

        let bin = self.data_part.bin_index_for(value);
        if !is_valid_index(bin) {
            return f64::NAN;
        }
        let t = (self.data_part.interp_index_for(value) - bin as f64).clamp(0.0, 1.0);
        let lo = self.frac_values[bin];
        let hi = self.frac_values[bin + 1];
        lo + t * (hi - lo)
    }

    /// Evaluate every sample, keeping sentinels for out-of-domain values
    pub fn eval_all<T: Sample>(&self, values: &[T]) -> Vec<f64> {
        values.iter().map(|v| self.eval(v.to_f64())).collect()
    }

    pub fn frac_values(&self) -> &[f64] {
        &self.frac_values
    }

    pub fn data_part(&self) -> &Partition {
        &self.data_part
    }

    pub fn data_range(&self) -> Span {
        self.data_part.range()
    }

    pub fn num_bins(&self) -> usize {
        self.frac_values.len().saturating_sub(1)
    }

    /// Probability mass per bin (the PDF this CDF integrates)
    pub fn bin_probabilities(&self) -> Vec<f64> {
        self.frac_values.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

impl fmt::Display for CdfForward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return writeln!(f, "# CdfForward(null)");
        }
        writeln!(f, "# CdfForward over {}", self.data_part)?;
        writeln!(f, "# index value fraction")?;
        for (i, frac) in self.frac_values.iter().enumerate() {
            let value = if i == self.num_bins() {
                self.data_part.max()
            } else {
                self.data_part.interp_value_for(i as f64)
            };
            writeln!(f, "{} {} {}", i, value, frac)?;
        }
        Ok(())
    }
}
