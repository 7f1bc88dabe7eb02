//! Post-run statistics
//!
//! Runs exactly once, after every worker has been joined. Percentiles use the
//! nearest-rank method on a sorted copy of the samples: the value at index
//! `floor(n * p / 100)`, clamped to the last element. No interpolation.

use std::time::Duration;

use tracing::debug;

use super::accumulator::RunResult;
use super::summary::{RunSettings, Summary};
use crate::utils::{BenchmarkError, Result};

/// Turns an accumulated [`RunResult`] into a finalized [`Summary`]
pub struct Aggregator;

impl Aggregator {
    /// Finalize the run statistics
    ///
    /// `wall_clock` is the observed span of the run, from worker spawn to the
    /// last join. Fails with [`BenchmarkError::NoSamples`] when nothing was
    /// recorded.
    pub fn finalize(result: RunResult, wall_clock: Duration, settings: RunSettings) -> Result<Summary> {
        let iterations = result.iteration_count();
        if iterations == 0 {
            return Err(BenchmarkError::NoSamples);
        }
        if !result.is_consistent() {
            return Err(BenchmarkError::Worker(format!(
                "sample count mismatch: {} samples, {} succeeded, {} failed",
                iterations, result.success_count, result.failure_count
            )));
        }

        let sorted = sorted_samples(&result.samples);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        // Running extremes exist only for results merged from workers
        if !result.workers.is_empty() && (min != result.min || max != result.max) {
            return Err(BenchmarkError::Worker(format!(
                "extremes mismatch: samples span {:?}..{:?}, workers reported {:?}..{:?}",
                min, max, result.min, result.max
            )));
        }

        let wall_secs = wall_clock.as_secs_f64();
        let throughput = if wall_secs <= f64::EPSILON {
            0.0
        } else {
            iterations as f64 / wall_secs
        };

        debug!(
            "Aggregated {} samples from {} workers over {:.3}s",
            iterations,
            result.workers.len(),
            wall_secs
        );

        Ok(Summary {
            settings,
            iterations,
            success_count: result.success_count,
            failure_count: result.failure_count,
            mean: mean_of(result.sum_elapsed, iterations),
            min,
            max,
            median: median(&sorted),
            p80: percentile(&sorted, 80),
            p95: percentile(&sorted, 95),
            p99: percentile(&sorted, 99),
            total_wall_clock: wall_clock,
            throughput,
            workers: result.workers,
        })
    }
}

/// Stable ascending sort of a copy of the samples
pub fn sorted_samples(samples: &[Duration]) -> Vec<Duration> {
    let mut sorted = samples.to_vec();
    sorted.sort();
    sorted
}

/// Median of a sorted, non-empty slice
///
/// Even length averages the two middle elements.
pub fn median(sorted: &[Duration]) -> Duration {
    let n = sorted.len();
    if n == 0 {
        return Duration::ZERO;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2
    } else {
        sorted[n / 2]
    }
}

/// Nearest-rank percentile of a sorted, non-empty slice (`p` in 0..=100)
pub fn percentile(sorted: &[Duration], p: u32) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = sorted.len() * p as usize / 100;
    sorted[idx.min(sorted.len() - 1)]
}

/// Mean of `count` durations summing to `sum`
pub fn mean_of(sum: Duration, count: u64) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let nanos = sum.as_nanos() / count as u128;
    Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::worker::WorkerResult;
    use crate::workload::{Outcome, Sample};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn settings() -> RunSettings {
        RunSettings::new("test", 1, Duration::from_secs(1))
    }

    fn run_result(samples: &[(u64, bool)]) -> RunResult {
        let mut worker = WorkerResult::new(0);
        for &(v, ok) in samples {
            let outcome = if ok { Outcome::Success } else { Outcome::Failure };
            worker.record(Sample::new(ms(v), outcome));
        }
        RunResult::from_workers(vec![worker])
    }

    #[test]
    fn test_zero_samples_is_error() {
        let result = Aggregator::finalize(RunResult::new(), Duration::from_secs(1), settings());
        assert!(matches!(result, Err(BenchmarkError::NoSamples)));
    }

    #[test]
    fn test_inconsistent_counters_rejected() {
        let mut result = run_result(&[(1, true)]);
        result.success_count += 1;
        let err = Aggregator::finalize(result, Duration::from_secs(1), settings());
        assert!(matches!(err, Err(BenchmarkError::Worker(_))));
    }

    #[test]
    fn test_hand_built_result_uses_sorted_extremes() {
        let mut result = RunResult::new();
        result.samples = vec![ms(3), ms(1)];
        result.success_count = 2;

        let summary = Aggregator::finalize(result, Duration::from_secs(1), settings()).unwrap();
        assert_eq!(summary.min, ms(1));
        assert_eq!(summary.max, ms(3));
        assert_eq!(summary.median, ms(2));
    }

    #[test]
    fn test_mismatched_worker_extremes_rejected() {
        let mut result = run_result(&[(2, true), (4, true)]);
        result.max = ms(9);
        let err = Aggregator::finalize(result, Duration::from_secs(1), settings());
        assert!(matches!(err, Err(BenchmarkError::Worker(_))));
    }

    #[test]
    fn test_fixed_latency_statistics() {
        let samples: Vec<(u64, bool)> = (0..100).map(|_| (10, true)).collect();
        let summary = Aggregator::finalize(run_result(&samples), Duration::from_secs(1), settings()).unwrap();

        assert_eq!(summary.iterations, 100);
        assert_eq!(summary.mean, ms(10));
        assert_eq!(summary.min, ms(10));
        assert_eq!(summary.max, ms(10));
        assert_eq!(summary.median, ms(10));
        assert_eq!(summary.p80, ms(10));
        assert_eq!(summary.p95, ms(10));
        assert_eq!(summary.p99, ms(10));
        assert_eq!(summary.throughput, 100.0);
    }

    #[test]
    fn test_statistics_unsorted_input() {
        // sorted: 1..=10 ms, n=10
        // median: (5 + 6) / 2 = 5.5ms
        // p80: index 8 -> 9ms, p95: index 9 -> 10ms, p99: index 9 -> 10ms
        let samples = [(7, true), (3, true), (10, false), (1, true), (5, true), (9, true), (2, true), (8, false), (4, true), (6, true)];
        let summary = Aggregator::finalize(run_result(&samples), Duration::from_secs(2), settings()).unwrap();

        assert_eq!(summary.min, ms(1));
        assert_eq!(summary.max, ms(10));
        assert_eq!(summary.median, Duration::from_micros(5_500));
        assert_eq!(summary.p80, ms(9));
        assert_eq!(summary.p95, ms(10));
        assert_eq!(summary.p99, ms(10));
        assert_eq!(summary.mean, Duration::from_micros(5_500));
        assert_eq!(summary.success_count, 8);
        assert_eq!(summary.failure_count, 2);
        assert_eq!(summary.throughput, 5.0);
    }

    #[test]
    fn test_median_keyed_on_sample_count() {
        assert_eq!(median(&[ms(1), ms(2), ms(9)]), ms(2));
        assert_eq!(median(&[ms(1), ms(3)]), ms(2));
        assert_eq!(median(&[ms(4)]), ms(4));
    }

    #[test]
    fn test_percentile_nearest_rank() {
        // n=5: p80 -> index 4, p50 -> index 2
        let sorted = [ms(1), ms(2), ms(3), ms(4), ms(5)];
        assert_eq!(percentile(&sorted, 80), ms(5));
        assert_eq!(percentile(&sorted, 50), ms(3));
        assert_eq!(percentile(&sorted, 0), ms(1));
        assert_eq!(percentile(&sorted, 100), ms(5));
        assert_eq!(percentile(&[ms(7)], 99), ms(7));
    }

    #[test]
    fn test_ordering_invariants() {
        let mut rng = fastrand::Rng::with_seed(42);
        for n in 1..200u64 {
            let samples: Vec<(u64, bool)> = (0..n).map(|_| (rng.u64(1..500), true)).collect();
            let s = Aggregator::finalize(run_result(&samples), Duration::from_secs(1), settings()).unwrap();

            assert!(s.min <= s.median && s.median <= s.max);
            assert!(s.min <= s.p80);
            assert!(s.p80 <= s.p95);
            assert!(s.p95 <= s.p99);
            assert!(s.p99 <= s.max);
            assert!(s.min <= s.mean && s.mean <= s.max);
        }
    }

    #[test]
    fn test_sort_is_idempotent() {
        let samples = [ms(5), ms(1), ms(5), ms(3), ms(2)];
        let once = sorted_samples(&samples);
        let twice = sorted_samples(&once);
        assert_eq!(once, twice);
        assert_eq!(once, vec![ms(1), ms(2), ms(3), ms(5), ms(5)]);
    }

    #[test]
    fn test_mean_of() {
        assert_eq!(mean_of(Duration::ZERO, 0), Duration::ZERO);
        assert_eq!(mean_of(ms(30), 3), ms(10));
        assert_eq!(mean_of(Duration::from_nanos(10), 4), Duration::from_nanos(2));
    }
}
