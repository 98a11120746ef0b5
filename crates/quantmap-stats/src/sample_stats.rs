//! One-pass summaries of a sample set over a shared partition

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cdf_forward::CdfForward;
use crate::frac9::Frac9;
use crate::histogram::Histogram;
use crate::partition::Partition;
use crate::sample::Sample;

/// Shannon entropy of a binned distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleEntropy {
    /// `-Σ p·ln(p)` over non-zero bins
    nats_per_element: f64,
    count: usize,
}

impl SampleEntropy {
    /// Entropy of per-bin probabilities `pdf`, drawn from `count` samples
    pub fn from_probabilities(pdf: &[f64], count: usize) -> Self {
        let nats_per_element = pdf
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.ln())
            .sum();
        Self {
            nats_per_element,
            count,
        }
    }

    /// Entropy per sample in units of `log(base)` (2 for bits)
    pub fn per_element(&self, base: f64) -> f64 {
        self.nats_per_element / base.ln()
    }

    /// Entropy of the whole sample set in units of `log(base)`
    pub fn in_total(&self, base: f64) -> f64 {
        self.per_element(base) * self.count as f64
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Count, histogram, PDF, entropy, CDF and fractiles of one sample set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleStats {
    histogram: Histogram,
    pdf: Vec<f64>,
    entropy: SampleEntropy,
    cdf_fwd: CdfForward,
    frac9: Frac9,
}

impl SampleStats {
    /// Summarize `samples` binned by `part`
    ///
    /// Samples outside the partition are left out of every statistic but
    /// remain visible through [`Histogram::num_below`] and friends.
    pub fn from_samples<T: Sample>(samples: &[T], part: Partition) -> Self {
        let histogram = Histogram::from_samples(samples, part);
        let count = histogram.total();
        let pdf = histogram.pdf();
        let entropy = SampleEntropy::from_probabilities(&pdf, count);
        let cdf_fwd = CdfForward::from_histogram(&histogram);
        let frac9 = if count > 0 {
            Frac9::from_forward(&cdf_fwd)
        } else {
            Frac9::null()
        };

        Self {
            histogram,
            pdf,
            entropy,
            cdf_fwd,
            frac9,
        }
    }

    /// Summarize over a partition spanning the samples themselves
    pub fn from_samples_spanning<T: Sample>(samples: &[T], num_bins: usize, end_epsilon: f64) -> Self {
        let part = Partition::spanning_values(samples, num_bins, end_epsilon);
        Self::from_samples(samples, part)
    }

    /// Samples that fell inside the partition
    pub fn count(&self) -> usize {
        self.histogram.total()
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn partition(&self) -> &Partition {
        self.histogram.partition()
    }

    pub fn pdf(&self) -> &[f64] {
        &self.pdf
    }

    pub fn entropy(&self) -> &SampleEntropy {
        &self.entropy
    }

    pub fn cdf_fwd(&self) -> &CdfForward {
        &self.cdf_fwd
    }

    pub fn frac9(&self) -> &Frac9 {
        &self.frac9
    }

    pub fn is_valid(&self) -> bool {
        self.partition().is_valid() && self.cdf_fwd.is_valid()
    }
}

impl fmt::Display for SampleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "partition: {}", self.partition())?;
        writeln!(
            f,
            "count: {} (below {}, above {}, invalid {})",
            self.count(),
            self.histogram.num_below(),
            self.histogram.num_above(),
            self.histogram.num_invalid()
        )?;
        writeln!(
            f,
            "entropy: {:.6} bits/element, {:.6} bits total",
            self.entropy.per_element(2.0),
            self.entropy.in_total(2.0)
        )?;
        write!(f, "{}", self.frac9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Span;

    fn five_spikes() -> Vec<f64> {
        [10.0, 20.0, 50.0, 80.0, 90.0]
            .iter()
            .flat_map(|&v| std::iter::repeat(v).take(4))
            .collect()
    }

    #[test]
    fn test_entropy_five_spikes() {
        let part = Partition::new(Span::new(0.0, 100.0), 100);
        let stats = SampleStats::from_samples(&five_spikes(), part);

        let p: f64 = 4.0 / 20.0;
        let expected = -5.0 * p * p.log2();
        assert_eq!(stats.count(), 20);
        assert!((stats.entropy().per_element(2.0) - expected).abs() < 1e-12);
        assert!((stats.entropy().per_element(2.0) - 2.321928094887362).abs() < 1e-12);
        assert!((stats.entropy().in_total(2.0) - expected * 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_entropy_single_bin_is_zero() {
        let entropy = SampleEntropy::from_probabilities(&[0.0, 1.0, 0.0], 7);
        assert_eq!(entropy.per_element(2.0), 0.0);
        assert_eq!(entropy.in_total(2.0), 0.0);
        assert_eq!(entropy.count(), 7);
    }

    #[test]
    fn test_entropy_base_conversion() {
        let entropy = SampleEntropy::from_probabilities(&[0.5, 0.5], 2);
        assert!((entropy.per_element(2.0) - 1.0).abs() < 1e-15);
        assert!((entropy.per_element(std::f64::consts::E) - std::f64::consts::LN_2).abs() < 1e-15);
    }

    #[test]
    fn test_stats_pieces_agree() {
        let part = Partition::new(Span::new(0.0, 100.0), 100);
        let stats = SampleStats::from_samples(&five_spikes(), part);
        assert!(stats.is_valid());
        assert_eq!(stats.histogram().counts()[50], 4);
        assert_eq!(stats.pdf()[20], 0.2);
        assert_eq!(stats.cdf_fwd().eval(50.0), 0.4);
        assert!(stats.frac9().is_valid());
        assert_eq!(stats.frac9().min(), 0.0);
        assert_eq!(stats.frac9().max(), 100.0);
        assert!(stats.frac9().median() >= 50.0 && stats.frac9().median() <= 51.0);
    }

    #[test]
    fn test_stats_spanning() {
        let stats = SampleStats::from_samples_spanning(&[1_i32, 2, 3, 4], 4, 1e-9);
        assert_eq!(stats.count(), 4);
        assert_eq!(stats.partition().min(), 1.0);
    }

    #[test]
    fn test_stats_empty() {
        let empty: [f64; 0] = [];
        let stats = SampleStats::from_samples_spanning(&empty, 8, 1e-9);
        assert!(!stats.is_valid());
        assert_eq!(stats.count(), 0);
        assert!(!stats.frac9().is_valid());
    }

    #[test]
    fn test_stats_display() {
        let part = Partition::new(Span::new(0.0, 100.0), 100);
        let text = SampleStats::from_samples(&five_spikes(), part).to_string();
        assert!(text.contains("count: 20"));
        assert!(text.contains("bits/element"));
    }
}
