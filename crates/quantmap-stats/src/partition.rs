//! Equal-width partitions of a continuous interval
//!
//! A [`Partition`] splits the half-open range `[min, min + size*delta)`
//! into `size` bins and converts between data values and (fractional)
//! bin indices. Every other type in this crate leans on it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sample::{Sample, NULL_INDEX};

/// A closed data range `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The invalid span
    pub fn null() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
        }
    }

    /// A span is usable when both ends are finite and `min < max`
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    /// Width of the span
    pub fn magnitude(&self) -> f64 {
        self.max - self.min
    }

    /// Whether `value` lies in the closed range
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Equal-width partition of `[min, min + size*delta)`
///
/// The upper bound is kept as given rather than recomputed from `delta`,
/// so `max()` reproduces the constructing span exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    min: f64,
    max: f64,
    delta: f64,
    num_parts: usize,
}

impl Partition {
    /// Partition `span` into `num_parts` equal bins
    ///
    /// Returns the null partition for an invalid span or zero parts.
    pub fn new(span: Span, num_parts: usize) -> Self {
        if !span.is_valid() || num_parts == 0 {
            return Self::null();
        }
        let delta = span.magnitude() / num_parts as f64;
        if !(delta > 0.0 && delta.is_finite()) {
            return Self::null();
        }
        Self {
            min: span.min,
            max: span.max,
            delta,
            num_parts,
        }
    }

    /// The canonical invalid partition
    pub fn null() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
            delta: f64::NAN,
            num_parts: 0,
        }
    }

    /// Partition spanning the keys extracted from `items`
    ///
    /// `min` is the smallest key; the upper bound is the largest key plus
    /// `end_epsilon` so the largest sample lands strictly inside the last
    /// bin. Non-finite keys are ignored. An empty input gives the null
    /// partition.
    pub fn spanning<I, F>(items: I, num_parts: usize, end_epsilon: f64, key: F) -> Self
    where
        I: IntoIterator,
        F: Fn(I::Item) -> f64,
    {
        let (lo, hi) = items
            .into_iter()
            .map(key)
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi {
            return Self::null();
        }
        let mut upper = hi + end_epsilon;
        if end_epsilon > 0.0 && upper <= hi {
            // epsilon is below the spacing of doubles near `hi`
            upper = next_up(hi);
        }
        Self::new(Span::new(lo, upper), num_parts)
    }

    /// [`Partition::spanning`] over plain numeric values
    pub fn spanning_values<T: Sample>(values: &[T], num_parts: usize, end_epsilon: f64) -> Self {
        Self::spanning(values.iter(), num_parts, end_epsilon, |v| v.to_f64())
    }

    pub fn is_valid(&self) -> bool {
        self.num_parts > 0 && self.min.is_finite() && self.delta.is_finite() && self.delta > 0.0
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    /// Exclusive upper bound
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of bins
    pub fn size(&self) -> usize {
        self.num_parts
    }

    /// Full range as a span
    pub fn range(&self) -> Span {
        if !self.is_valid() {
            return Span::null();
        }
        Span::new(self.min, self.max)
    }

    /// Index of the bin holding `value`, or [`NULL_INDEX`] outside `[min, max)`
    pub fn bin_index_for(&self, value: f64) -> usize {
        if !self.is_valid() || !(self.min <= value && value < self.max) {
            return NULL_INDEX;
        }
        let ndx = ((value - self.min) / self.delta).floor() as usize;
        // rounding can push values just below max into a phantom bin
        ndx.min(self.num_parts - 1)
    }

    /// Data value at a fractional index (unclamped)
    pub fn interp_value_for(&self, sub_index: f64) -> f64 {
        self.min + sub_index * self.delta
    }

    /// Fractional index of a data value (unclamped)
    pub fn interp_index_for(&self, value: f64) -> f64 {
        (value - self.min) / self.delta
    }

    /// Half-open range covered by bin `ndx`
    pub fn range_for_bin(&self, ndx: usize) -> Span {
        if !self.is_valid() || ndx >= self.num_parts {
            return Span::null();
        }
        let hi = if ndx + 1 == self.num_parts {
            self.max
        } else {
            self.interp_value_for((ndx + 1) as f64)
        };
        Span::new(self.interp_value_for(ndx as f64), hi)
    }

    /// Midpoint of bin `ndx`
    pub fn bin_center(&self, ndx: usize) -> f64 {
        if !self.is_valid() || ndx >= self.num_parts {
            return f64::NAN;
        }
        self.interp_value_for(ndx as f64 + 0.5)
    }
}

/// Smallest double greater than a finite `value`
fn next_up(value: f64) -> f64 {
    if value == 0.0 {
        return f64::from_bits(1);
    }
    let bits = value.to_bits();
    if value > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "Partition(null)");
        }
        write!(
            f,
            "Partition([{}, {}) x {}, delta {})",
            self.min,
            self.max,
            self.num_parts,
            self.delta
        )
    }
}
