//! Distribution remapping by CDF composition
//!
//! A [`Remapper`] sends a value through the forward CDF of its source
//! distribution and the inverse CDF of a target distribution. With a
//! uniform target this is histogram equalization; with an empirical
//! target it is distribution matching.

use serde::{Deserialize, Serialize};

use crate::cdf_forward::CdfForward;
use crate::cdf_inverse::CdfInverse;
use crate::sample::Sample;

/// `cdf_inv(cdf_fwd(x))` as a reusable functor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remapper {
    cdf_fwd: CdfForward,
    cdf_inv: CdfInverse,
}

impl Remapper {
    pub fn new(cdf_fwd: CdfForward, cdf_inv: CdfInverse) -> Self {
        Self { cdf_fwd, cdf_inv }
    }

    /// Map the `source` distribution onto the `target` distribution
    pub fn matching(source: &CdfForward, target: &CdfForward, lut_size: usize) -> Self {
        Self::new(source.clone(), CdfInverse::from_cdf_forward(target, lut_size))
    }

    /// Map the `source` distribution onto a uniform one over the same range
    pub fn equalizing(source: &CdfForward, lut_size: usize) -> Self {
        let cdf_inv = CdfInverse::generate_for(|_| 1.0, source.data_range(), lut_size);
        Self::new(source.clone(), cdf_inv)
    }

    pub fn is_valid(&self) -> bool {
        self.cdf_fwd.is_valid() && self.cdf_inv.is_valid()
    }

    /// Remap one value in `f64`
    ///
    /// NaN when `value` lies outside the source domain.
    pub fn remap_f64(&self, value: f64) -> f64 {
        let prob = self.cdf_fwd.eval(value);
        if prob.is_nan() {
            return f64::NAN;
        }
        self.cdf_inv.eval(prob)
    }

    /// Remap one value of the caller's type
    ///
    /// Integral results are truncated, not rounded. Values outside the
    /// source domain come back as `T::null()`.
    pub fn apply<T: Sample>(&self, value: T) -> T {
        if !value.is_valid() {
            return T::null();
        }
        let out = self.remap_f64(value.to_f64());
        if out.is_nan() {
            return T::null();
        }
        T::from_f64(out)
    }

    /// Remap a batch of values
    pub fn apply_all<T: Sample>(&self, values: &[T]) -> Vec<T> {
        values.iter().map(|&v| self.apply(v)).collect()
    }

    pub fn cdf_fwd(&self) -> &CdfForward {
        &self.cdf_fwd
    }

    pub fn cdf_inv(&self) -> &CdfInverse {
        &self.cdf_inv
    }
}
