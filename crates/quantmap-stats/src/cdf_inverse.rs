//! Inverse CDFs (quantile functions) as look-up tables
//!
//! A [`CdfInverse`] tabulates, for `lut_size + 1` evenly spaced
//! probabilities, the fractional data index at which the forward CDF
//! reaches that probability. Steep stretches of the forward CDF therefore
//! receive many table rows per data bin and flat stretches few, so the
//! table resolves the data axis where the mass actually is.
//!
//! Evaluation is linear interpolation between table rows followed by the
//! data partition's index-to-value conversion. `eval(0)` is the lower data
//! bound and `eval(1)` the upper data bound, both exactly.

use serde::{Deserialize, Serialize};

use crate::cdf_forward::CdfForward;
use crate::partition::{Partition, Span};

/// Quantile function backed by a table of fractional data indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdfInverse {
    data_indices: Vec<f64>,
    frac_part: Partition,
    data_part: Partition,
}

impl CdfInverse {
    /// The invalid inverse
    pub fn null() -> Self {
        Self {
            data_indices: Vec::new(),
            frac_part: Partition::null(),
            data_part: Partition::null(),
        }
    }

    /// Tabulate a quantile function from a density generator
    ///
    /// `prob_func` is sampled at the `lut_size` fractions `k / lut_size` of
    /// `data_range` and returns a relative density there. The densities
    /// become a forward CDF over `data_range`, which is then inverted.
    pub fn generate_for<F>(prob_func: F, data_range: Span, lut_size: usize) -> Self
    where
        F: Fn(f64) -> f64,
    {
        if lut_size == 0 || !data_range.is_valid() {
            return Self::null();
        }
        let densities: Vec<f64> = (0..lut_size)
            .map(|k| prob_func(k as f64 / lut_size as f64))
            .collect();
        let cdf_fwd = CdfForward::from_freqs(&densities, data_range);
        Self::from_cdf_forward(&cdf_fwd, lut_size)
    }

    /// Invert a forward CDF into a table of `lut_size + 1` rows
    pub fn from_cdf_forward(cdf_fwd: &CdfForward, lut_size: usize) -> Self {
        if !cdf_fwd.is_valid() || lut_size == 0 {
            return Self::null();
        }
        let frac_part = Partition::new(Span::new(0.0, 1.0), lut_size);
        // a degenerate CDF holds all of its mass at the lower bound
        let data_indices = if cdf_fwd.is_degenerate() {
            vec![0.0; lut_size + 1]
        } else {
            Self::ndx_locs_for_uniform_delta(cdf_fwd.frac_values(), lut_size)
        };

        debug_assert_eq!(data_indices.len(), lut_size + 1);
        debug_assert!(data_indices.windows(2).all(|w| w[0] <= w[1]));

        Self {
            data_indices,
            frac_part,
            data_part: *cdf_fwd.data_part(),
        }
    }

    /// Fractional indices into `frac_values` for probabilities `k / lut_size`
    ///
    /// For each target probability `p` the smallest index `i` with
    /// `frac_values[i] >= p` is located by a forward walk (the targets are
    /// increasing, so the walk never restarts) and the position inside
    /// segment `[i-1, i]` is found by inverse linear interpolation. When
    /// several indices share a probability the smallest one wins.
    pub fn ndx_locs_for_uniform_delta(frac_values: &[f64], lut_size: usize) -> Vec<f64> {
        let mut locs = Vec::with_capacity(lut_size + 1);
        if frac_values.len() < 2 || lut_size == 0 {
            return locs;
        }
        let last = frac_values.len() - 1;

        let mut i = 1;
        for k in 0..=lut_size {
            let p = k as f64 / lut_size as f64;
            if p <= frac_values[0] {
                locs.push(0.0);
                continue;
            }
            while i < last && frac_values[i] < p {
                i += 1;
            }
            let lo = frac_values[i - 1];
            let hi = frac_values[i];
            let loc = if hi > lo {
                (i - 1) as f64 + ((p - lo) / (hi - lo)).clamp(0.0, 1.0)
            } else {
                i as f64
            };
            locs.push(loc);
        }
        locs
    }

    pub fn is_valid(&self) -> bool {
        !self.data_indices.is_empty() && self.frac_part.is_valid() && self.data_part.is_valid()
    }

    /// Data value at which the forward CDF reaches `prob`
    ///
    /// NaN for probabilities outside `[0, 1]`.
    pub fn eval(&self, prob: f64) -> f64 {
        if !self.is_valid() || !(0.0..=1.0).contains(&prob) {
            return f64::NAN;
        }
        if prob == 1.0 {
            return self.data_part.max();
        }

        let lut_size = self.lut_size();
        let row = Self::row_for(prob, lut_size);
        let ndx = (row.floor() as usize).min(lut_size - 1);
        let t = (row - ndx as f64).clamp(0.0, 1.0);
        let lo = self.data_indices[ndx];
        let hi = self.data_indices[ndx + 1];
        let data_index = lo + t * (hi - lo);

        // indices at or past the last bin map to the stored upper bound
        if data_index >= self.data_part.size() as f64 {
            return self.data_part.max();
        }
        self.data_part
            .interp_value_for(data_index)
            .min(self.data_part.max())
    }

    /// Fractional table row for `prob`
    ///
    /// Rows within a few ULPs of an integer are snapped to it, so a
    /// probability that came from `k / lut_size` lands exactly on row `k`.
    fn row_for(prob: f64, lut_size: usize) -> f64 {
        let row = prob * lut_size as f64;
        let nearest = row.round();
        if (row - nearest).abs() <= 4.0 * f64::EPSILON * nearest.max(1.0) {
            nearest
        } else {
            row
        }
    }

    /// Evaluate a batch of probabilities
    pub fn eval_all(&self, probs: &[f64]) -> Vec<f64> {
        probs.iter().map(|&p| self.eval(p)).collect()
    }

    pub fn data_indices(&self) -> &[f64] {
        &self.data_indices
    }

    pub fn frac_part(&self) -> &Partition {
        &self.frac_part
    }

    pub fn data_part(&self) -> &Partition {
        &self.data_part
    }

    pub fn data_range(&self) -> Span {
        self.data_part.range()
    }

    /// Number of table intervals
    pub fn lut_size(&self) -> usize {
        self.data_indices.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frac9::Frac9;

    #[test]
    fn test_ndx_locs_uniform() {
        let locs = CdfInverse::ndx_locs_for_uniform_delta(&[0.0, 0.25, 0.5, 0.75, 1.0], 4);
        assert_eq!(locs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_ndx_locs_skewed() {
        // all mass in the second half of a two-bin table
        let locs = CdfInverse::ndx_locs_for_uniform_delta(&[0.0, 0.0, 1.0], 4);
        assert_eq!(locs, vec![0.0, 1.25, 1.5, 1.75, 2.0]);
    }

    #[test]
    fn test_ndx_locs_ties_take_smallest_index() {
        // probability 0.5 is reached at index 1 and held through index 3
        let locs = CdfInverse::ndx_locs_for_uniform_delta(&[0.0, 0.5, 0.5, 0.5, 1.0], 2);
        assert_eq!(locs, vec![0.0, 1.0, 4.0]);
    }

    #[test]
    fn test_boundaries_exact() {
        let range = Span::new(-3.7, 12.9);
        let cdf = CdfForward::from_freqs(&[3.0, 1.0, 0.0, 7.0, 2.0], range);
        let inv = CdfInverse::from_cdf_forward(&cdf, 1000);
        assert!(inv.is_valid());
        assert_eq!(inv.eval(0.0), range.min);
        assert_eq!(inv.eval(1.0), range.max);
    }

    #[test]
    fn test_out_of_range_probabilities() {
        let cdf = CdfForward::from_freqs(&[1.0, 1.0], Span::new(0.0, 1.0));
        let inv = CdfInverse::from_cdf_forward(&cdf, 16);
        assert!(inv.eval(-1e-15).is_nan());
        assert!(inv.eval(1.0 + 1e-15).is_nan());
        assert!(inv.eval(f64::NAN).is_nan());
    }

    #[test]
    fn test_single_bin_mass() {
        // all-zero except one bin still gives a usable inverse
        let cdf = CdfForward::from_freqs(&[0.0, 0.0, 4.0, 0.0], Span::new(0.0, 4.0));
        let inv = CdfInverse::from_cdf_forward(&cdf, 8);
        assert!(inv.is_valid());
        assert_eq!(inv.eval(0.0), 0.0);
        assert_eq!(inv.eval(0.5), 2.5);
        assert_eq!(inv.eval(1.0), 4.0);
        for k in 1..8 {
            let v = inv.eval(k as f64 / 8.0);
            assert!((2.0..=3.0).contains(&v), "{}", v);
        }
    }

    #[test]
    fn test_monotone_evaluation() {
        let cdf = CdfForward::from_freqs(&[5.0, 0.0, 1.0, 9.0, 0.0, 2.0], Span::new(10.0, 70.0));
        let inv = CdfInverse::from_cdf_forward(&cdf, 64);
        let mut prev = f64::NEG_INFINITY;
        for k in 0..=1000 {
            let v = inv.eval(k as f64 / 1000.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(!CdfInverse::from_cdf_forward(&CdfForward::null(), 16).is_valid());
        let cdf = CdfForward::from_freqs(&[1.0], Span::new(0.0, 1.0));
        assert!(!CdfInverse::from_cdf_forward(&cdf, 0).is_valid());
        assert!(CdfInverse::null().eval(0.5).is_nan());
    }

    #[test]
    fn test_degenerate_forward_keeps_mass_at_min() {
        let cdf = CdfForward::from_freqs::<f64>(&[], Span::new(0.0, 10.0));
        assert!(cdf.is_degenerate());
        let inv = CdfInverse::from_cdf_forward(&cdf, 64);
        assert!(inv.is_valid());
        for p in [0.0, 0.25, 0.5, 0.99, 1.0 - 1e-12] {
            assert_eq!(inv.eval(p), 0.0, "p={}", p);
            assert_eq!(cdf.eval(inv.eval(p)), 0.0);
        }
        assert_eq!(inv.eval(1.0), 10.0);

        let frac9 = Frac9::from_forward(&cdf);
        assert_eq!(frac9.median(), 0.0);
        assert_eq!(frac9.p99(), 0.0);
        assert_eq!(frac9.max(), 10.0);
    }

    #[test]
    fn test_rows_land_on_table_entries() {
        for lut_size in [3_usize, 10, 100, 255, 1000, 4096] {
            for k in 0..=lut_size {
                let p = k as f64 / lut_size as f64;
                assert_eq!(CdfInverse::row_for(p, lut_size), k as f64, "lut={} k={}", lut_size, k);
            }
        }
        assert_eq!(CdfInverse::row_for(0.55, 10), 5.5);
    }

    #[test]
    fn test_generate_for_linear_density() {
        // density proportional to x on [0, 1]: quantile is sqrt(p)
        let inv = CdfInverse::generate_for(|x| x + 0.5 / 4096.0, Span::new(0.0, 1.0), 4096);
        assert!(inv.is_valid());
        assert_eq!(inv.lut_size(), 4096);
        for p in [0.04, 0.25, 0.5, 0.81] {
            assert!((inv.eval(p) - f64::sqrt(p)).abs() < 1e-3, "p={}", p);
        }
    }

    #[test]
    fn test_generate_for_rejects_bad_input() {
        assert!(!CdfInverse::generate_for(|_| 1.0, Span::new(0.0, 1.0), 0).is_valid());
        assert!(!CdfInverse::generate_for(|_| 1.0, Span::null(), 8).is_valid());
    }
}
