//! Raw run accumulation
//!
//! Collects the per-worker buffers after every worker has been joined. The
//! merge happens on the runner thread only, so no locking is involved.

use std::time::Duration;

use super::aggregator::mean_of;
use crate::benchmark::worker::WorkerResult;

/// Per-worker breakdown kept alongside the merged samples
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub iterations: u64,
    pub failures: u64,
    pub mean: Duration,
    pub max: Duration,
    /// p99 from the worker's HDR histogram (microsecond resolution)
    pub p99_approx: Duration,
}

impl WorkerSummary {
    pub fn from_result(result: &WorkerResult) -> Self {
        let iterations = result.iterations();
        let mean = mean_of(result.sum_elapsed, iterations);
        let p99_approx = if result.histogram.len() == 0 {
            Duration::ZERO
        } else {
            Duration::from_micros(result.histogram.value_at_percentile(99.0))
        };

        Self {
            worker_id: result.worker_id,
            iterations,
            failures: result.failure_count,
            mean,
            max: result.max,
            p99_approx,
        }
    }
}

/// Accumulated raw results of one run
///
/// Invariant: `iteration_count == success_count + failure_count == samples.len()`.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Elapsed time of every invocation across all workers (unordered)
    pub samples: Vec<Duration>,
    pub success_count: u64,
    pub failure_count: u64,
    pub sum_elapsed: Duration,
    /// Running extremes reported by the workers
    pub min: Duration,
    pub max: Duration,
    pub workers: Vec<WorkerSummary>,
}

impl RunResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            success_count: 0,
            failure_count: 0,
            sum_elapsed: Duration::ZERO,
            min: Duration::MAX,
            max: Duration::ZERO,
            workers: Vec::new(),
        }
    }

    /// Merge all worker buffers into one result
    pub fn from_workers(results: Vec<WorkerResult>) -> Self {
        let total: usize = results.iter().map(|r| r.samples.len()).sum();
        let mut merged = Self::new();
        merged.samples.reserve_exact(total);

        for result in results {
            merged.merge(result);
        }
        merged.workers.sort_by_key(|w| w.worker_id);
        merged
    }

    /// Merge one worker's buffer and counters
    pub fn merge(&mut self, result: WorkerResult) {
        self.workers.push(WorkerSummary::from_result(&result));

        self.success_count += result.success_count;
        self.failure_count += result.failure_count;
        self.sum_elapsed += result.sum_elapsed;
        if result.iterations() > 0 {
            self.min = self.min.min(result.min);
            self.max = self.max.max(result.max);
        }
        self.samples.extend(result.samples);
    }

    /// Total invocations recorded
    #[inline]
    pub fn iteration_count(&self) -> u64 {
        self.samples.len() as u64
    }

    /// Whether the counters agree with the number of recorded samples
    pub fn is_consistent(&self) -> bool {
        self.success_count + self.failure_count == self.iteration_count()
    }
}

impl Default for RunResult {
    fn default() -> Self {
        Self::new()
    }
}
