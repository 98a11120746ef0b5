//! Column statistics and remapping over CSV point files
//!
//! Every command works on one column of a point file. The column is
//! binned over its own value range, summarized into a forward CDF, and
//! (for `equalize` and `match`) pushed through a [`Remapper`] by a small
//! pool of worker threads fed from a [`GuardedQueue`].

use std::path::Path;
use std::time::Duration;

use quantmap_io::{load_from_csv, save_to_csv, Point3};
use quantmap_queue::GuardedQueue;
use quantmap_stats::{CdfForward, Frac9, Partition, Remapper, SampleStats};
use serde::Serialize;

use crate::config::{PartitionConfig, QuantmapConfig, WorkerConfig};
use crate::error::{CliError, Result};

/// Values of `column` across all points
pub fn column_values(points: &[Point3], column: usize) -> Result<Vec<f64>> {
    if column >= 3 {
        return Err(CliError::InvalidColumn(column));
    }
    Ok(points.iter().map(|p| p[column]).collect())
}

/// Partition spanning the finite values of a column
pub fn build_partition(values: &[f64], column: usize, config: &PartitionConfig) -> Result<Partition> {
    if !values.iter().any(|v| v.is_finite()) {
        return Err(CliError::EmptyColumn(column));
    }
    let part = Partition::spanning_values(values, config.bins, config.end_epsilon);
    if !part.is_valid() {
        return Err(CliError::InvalidPartition(column));
    }
    Ok(part)
}

/// Summary printed by `quantmap stats --json`
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub column: usize,
    pub bins: usize,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub invalid: usize,
    pub entropy_bits_per_element: f64,
    pub entropy_bits_total: f64,
    pub fractiles: FractileReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct FractileReport {
    pub min: f64,
    pub p01: f64,
    pub p10: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
}

impl From<&Frac9> for FractileReport {
    fn from(frac9: &Frac9) -> Self {
        Self {
            min: frac9.min(),
            p01: frac9.p01(),
            p10: frac9.p10(),
            q1: frac9.q1(),
            median: frac9.median(),
            q3: frac9.q3(),
            p90: frac9.p90(),
            p99: frac9.p99(),
            max: frac9.max(),
        }
    }
}

impl StatsReport {
    pub fn new(stats: &SampleStats, column: usize) -> Self {
        let part = stats.partition();
        Self {
            column,
            bins: part.size(),
            min: part.min(),
            max: part.max(),
            count: stats.count(),
            invalid: stats.histogram().num_invalid(),
            entropy_bits_per_element: stats.entropy().per_element(2.0),
            entropy_bits_total: stats.entropy().in_total(2.0),
            fractiles: FractileReport::from(stats.frac9()),
        }
    }
}

/// Statistics of one column
pub fn summarize(points: &[Point3], column: usize, config: &PartitionConfig) -> Result<SampleStats> {
    let values = column_values(points, column)?;
    let part = build_partition(&values, column, config)?;
    Ok(SampleStats::from_samples(&values, part))
}

fn column_cdf(points: &[Point3], column: usize, config: &PartitionConfig) -> Result<CdfForward> {
    let values = column_values(points, column)?;
    let part = build_partition(&values, column, config)?;
    Ok(CdfForward::from_samps(&values, part))
}

/// Remapper that flattens a column's distribution over its own range
pub fn equalizer(points: &[Point3], column: usize, config: &QuantmapConfig) -> Result<Remapper> {
    let cdf_fwd = column_cdf(points, column, &config.partition)?;
    Ok(Remapper::equalizing(&cdf_fwd, config.inversion.lut_size))
}

/// Remapper that gives `source`'s column the distribution of `target`'s
pub fn matcher(
    source: &[Point3],
    target: &[Point3],
    column: usize,
    config: &QuantmapConfig,
) -> Result<Remapper> {
    let source_cdf = column_cdf(source, column, &config.partition)?;
    let target_cdf = column_cdf(target, column, &config.partition)?;
    Ok(Remapper::matching(
        &source_cdf,
        &target_cdf,
        config.inversion.lut_size,
    ))
}

fn remap_point(point: &Point3, column: usize, remapper: &Remapper) -> Point3 {
    let mut out = *point;
    out[column] = remapper.remap_f64(point[column]);
    out
}

/// Remap `column` of every point on `workers.threads` scoped threads
///
/// Points are queued in chunks of `workers.chunk_size`; results come back
/// in input order. Other columns are copied unchanged.
pub fn remap_parallel(
    points: &[Point3],
    column: usize,
    remapper: &Remapper,
    workers: &WorkerConfig,
) -> Result<Vec<Point3>> {
    if column >= 3 {
        return Err(CliError::InvalidColumn(column));
    }
    let chunk_size = workers.chunk_size.max(1);
    let queue: GuardedQueue<(usize, &[Point3])> =
        GuardedQueue::with_wait(Duration::from_millis(workers.wait_ms));

    let joined: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers.threads.max(1))
            .map(|_| {
                scope.spawn(|| {
                    let mut done = Vec::new();
                    queue.drain_with(|(offset, chunk)| {
                        let remapped: Vec<Point3> = chunk
                            .iter()
                            .map(|p| remap_point(p, column, remapper))
                            .collect();
                        done.push((offset, remapped));
                    });
                    done
                })
            })
            .collect();

        for (ndx, chunk) in points.chunks(chunk_size).enumerate() {
            queue.add_item((ndx * chunk_size, chunk));
        }
        queue.deactivate();

        handles.into_iter().map(|h| h.join()).collect()
    });

    let mut chunks = Vec::new();
    for result in joined {
        chunks.extend(result.map_err(|_| CliError::WorkerPanicked)?);
    }
    chunks.sort_by_key(|(offset, _)| *offset);

    let remapped: Vec<Point3> = chunks.into_iter().flat_map(|(_, pts)| pts).collect();
    debug_assert_eq!(remapped.len(), points.len());
    Ok(remapped)
}

/// Outcome of a file-level remap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapSummary {
    pub points: usize,
    /// Points whose remapped column came out NaN
    pub invalid: usize,
}

fn write_remapped(
    points: &[Point3],
    column: usize,
    remapper: &Remapper,
    output: &Path,
    config: &QuantmapConfig,
) -> Result<RemapSummary> {
    let remapped = remap_parallel(points, column, remapper, &config.workers)?;
    let invalid = remapped.iter().filter(|p| p[column].is_nan()).count();
    if invalid > 0 {
        tracing::warn!(invalid, column, "Some points fell outside the source range");
    }
    save_to_csv(output, &remapped)?;
    tracing::info!(points = remapped.len(), output = %output.display(), "Wrote remapped points");
    Ok(RemapSummary {
        points: remapped.len(),
        invalid,
    })
}

/// `quantmap stats`
pub fn run_stats(input: &Path, column: usize, config: &QuantmapConfig) -> Result<SampleStats> {
    let points = load_from_csv(input)?;
    tracing::info!(points = points.len(), input = %input.display(), "Loaded points");
    summarize(&points, column, &config.partition)
}

/// `quantmap equalize`
pub fn run_equalize(
    input: &Path,
    output: &Path,
    column: usize,
    config: &QuantmapConfig,
) -> Result<RemapSummary> {
    let points = load_from_csv(input)?;
    tracing::info!(points = points.len(), input = %input.display(), "Equalizing column {}", column);
    let remapper = equalizer(&points, column, config)?;
    write_remapped(&points, column, &remapper, output, config)
}

/// `quantmap match`
pub fn run_match(
    source: &Path,
    target: &Path,
    output: &Path,
    column: usize,
    config: &QuantmapConfig,
) -> Result<RemapSummary> {
    let source_points = load_from_csv(source)?;
    let target_points = load_from_csv(target)?;
    tracing::info!(
        source = source_points.len(),
        target = target_points.len(),
        "Matching column {}",
        column
    );
    let remapper = matcher(&source_points, &target_points, column, config)?;
    write_remapped(&source_points, column, &remapper, output, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, f: impl Fn(f64) -> f64) -> Vec<Point3> {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                [f(t), i as f64, -(i as f64)]
            })
            .collect()
    }

    #[test]
    fn test_column_bounds() {
        let points = ramp(4, |t| t);
        assert!(column_values(&points, 2).is_ok());
        assert!(matches!(column_values(&points, 3), Err(CliError::InvalidColumn(3))));
    }

    #[test]
    fn test_partition_errors() {
        let config = PartitionConfig::default();
        assert!(matches!(
            build_partition(&[f64::NAN, f64::INFINITY], 1, &config),
            Err(CliError::EmptyColumn(1))
        ));

        let flat = PartitionConfig {
            bins: 16,
            end_epsilon: 0.0,
        };
        assert!(matches!(
            build_partition(&[2.0, 2.0, 2.0], 0, &flat),
            Err(CliError::InvalidPartition(0))
        ));
    }

    #[test]
    fn test_largest_value_stays_in_range() {
        let points: Vec<Point3> = (0..50).map(|i| [1.0e8 + i as f64, 0.0, 0.0]).collect();
        let stats = summarize(&points, 0, &PartitionConfig::default()).unwrap();
        assert_eq!(stats.count(), 50);
        assert_eq!(stats.histogram().num_above(), 0);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let points = ramp(1000, |t| t * t * 50.0);
        let config = QuantmapConfig::default();
        let remapper = equalizer(&points, 0, &config).unwrap();
        let serial: Vec<Point3> = points.iter().map(|p| remap_point(p, 0, &remapper)).collect();

        for (threads, chunk_size) in [(1, 1000), (3, 7), (8, 64), (2, 5000)] {
            let workers = WorkerConfig {
                threads,
                chunk_size,
                wait_ms: 1,
            };
            let parallel = remap_parallel(&points, 0, &remapper, &workers).unwrap();
            assert_eq!(parallel, serial, "threads={} chunk={}", threads, chunk_size);
        }
    }

    #[test]
    fn test_remap_empty_input() {
        let config = QuantmapConfig::default();
        let points = ramp(10, |t| t);
        let remapper = equalizer(&points, 0, &config).unwrap();
        let out = remap_parallel(&[], 0, &remapper, &config.workers).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_equalize_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        let points = ramp(1000, |t| t * t);
        save_to_csv(&input, &points).unwrap();

        let summary = run_equalize(&input, &output, 0, &QuantmapConfig::default()).unwrap();
        assert_eq!(summary, RemapSummary { points: 1000, invalid: 0 });

        let out = load_from_csv(&output).unwrap();
        assert_eq!(out.len(), points.len());
        let max = points[999][0];
        for (before, after) in points.iter().zip(out.iter()) {
            assert_eq!(before[1], after[1]);
            assert_eq!(before[2], after[2]);
            assert!((0.0..=max + 1e-6).contains(&after[0]));
        }
        assert!(out.windows(2).all(|w| w[0][0] <= w[1][0]));
        // the squared ramp comes back close to linear
        assert!((out[500][0] - 0.5 * max).abs() < 0.02, "{}", out[500][0]);
    }

    #[test]
    fn test_match_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.csv");
        let target = dir.path().join("target.csv");
        let output = dir.path().join("matched.csv");
        save_to_csv(&source, &ramp(500, |t| t * 10.0)).unwrap();
        save_to_csv(&target, &ramp(800, |t| 100.0 + t * 100.0)).unwrap();

        let summary = run_match(&source, &target, &output, 0, &QuantmapConfig::default()).unwrap();
        assert_eq!(summary.points, 500);
        assert_eq!(summary.invalid, 0);

        let out = load_from_csv(&output).unwrap();
        assert!(out.iter().all(|p| (100.0..=200.0).contains(&p[0])));
        assert_eq!(out[0][0], 100.0);
        assert!(out.windows(2).all(|w| w[0][0] <= w[1][0]));
    }

    #[test]
    fn test_stats_report() {
        let points: Vec<Point3> = (0..100).map(|i| [0.0, i as f64, 0.0]).collect();
        let stats = summarize(&points, 1, &PartitionConfig::default()).unwrap();
        let report = StatsReport::new(&stats, 1);
        assert_eq!(report.count, 100);
        assert_eq!(report.invalid, 0);
        assert_eq!(report.fractiles.min, 0.0);
        assert!((report.fractiles.median - 49.5).abs() < 1.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["column"], 1);
        assert_eq!(json["bins"], 256);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_stats(&dir.path().join("nope.csv"), 0, &QuantmapConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
