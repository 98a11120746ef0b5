//! Bin counting over a [`Partition`]

use serde::{Deserialize, Serialize};

use crate::partition::Partition;
use crate::sample::{is_valid_index, Sample};

/// Per-bin sample counts plus the samples that missed every bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    part: Partition,
    counts: Vec<usize>,
    num_below: usize,
    num_above: usize,
    num_invalid: usize,
}

impl Histogram {
    /// Count `samples` into the bins of `part`
    ///
    /// An invalid partition yields zero bins; every sample is then
    /// counted as invalid.
    pub fn from_samples<T: Sample>(samples: &[T], part: Partition) -> Self {
        let mut hist = Self {
            part,
            counts: vec![0; if part.is_valid() { part.size() } else { 0 }],
            num_below: 0,
            num_above: 0,
            num_invalid: 0,
        };
        for sample in samples {
            hist.add(sample.to_f64());
        }
        hist
    }

    fn add(&mut self, value: f64) {
        if !self.part.is_valid() || value.is_nan() {
            self.num_invalid += 1;
            return;
        }
        let ndx = self.part.bin_index_for(value);
        if is_valid_index(ndx) {
            self.counts[ndx] += 1;
        } else if value < self.part.min() {
            self.num_below += 1;
        } else {
            self.num_above += 1;
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.part
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Samples that landed in a bin
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn num_below(&self) -> usize {
        self.num_below
    }

    pub fn num_above(&self) -> usize {
        self.num_above
    }

    /// NaN samples, or every sample when the partition is null
    pub fn num_invalid(&self) -> usize {
        self.num_invalid
    }

    /// Normalized per-bin probabilities; all zero when nothing was binned
    pub fn pdf(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }
}
