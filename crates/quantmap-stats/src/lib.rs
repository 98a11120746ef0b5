//! quantmap-stats - Distribution tables and remapping
//!
//! This crate turns empirical samples into invertible, interpolatable
//! cumulative distribution functions:
//!
//! - **Partition**: equal-width bins over an interval, index <-> value
//! - **CdfForward**: piecewise-linear CDF from frequencies or samples
//! - **CdfInverse**: quantile look-up table built by inverting a CDF
//! - **Remapper**: `cdf_inv(cdf_fwd(x))`, i.e. equalization and matching
//! - **SampleStats / SampleEntropy / Frac9**: one-pass summaries
//!
//! # Invalid values
//!
//! Nothing here returns `Result`. Every type has an `is_valid` check and
//! operations without a meaningful answer return the sentinel of their
//! value type (NaN, `MAX`, or a null object), which the next stage passes
//! along. See [`sample`].

pub mod cdf_forward;
pub mod cdf_inverse;
pub mod frac9;
pub mod histogram;
pub mod partition;
pub mod remapper;
pub mod sample;
pub mod sample_stats;

pub use cdf_forward::*;
pub use cdf_inverse::*;
pub use frac9::*;
pub use histogram::*;
pub use partition::*;
pub use remapper::*;
pub use sample::*;
pub use sample_stats::*;
