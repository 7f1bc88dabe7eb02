//! Benchmark worker thread implementation
//!
//! Each worker owns its sample buffer and histogram exclusively. The only
//! synchronization points are the atomic counters used for the stop signal
//! and live progress. Buffers are handed back to the runner on join.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use tracing::{debug, warn};

use super::counters::GlobalCounters;
use super::progress::Progress;
use crate::workload::{Operation, Outcome, Sample};

/// Failures logged per worker before going quiet
const MAX_LOGGED_FAILURES: u64 = 3;

/// Create the per-worker latency histogram (1us to 1 hour, 3 significant digits)
pub(crate) fn new_histogram() -> Histogram<u64> {
    Histogram::new_with_bounds(1, 3_600_000_000, 3).expect("valid histogram bounds")
}

/// Result from a worker thread
#[derive(Debug)]
pub struct WorkerResult {
    /// Worker ID
    pub worker_id: usize,
    /// Elapsed time of every invocation, in arrival order
    pub samples: Vec<Duration>,
    /// Invocations that succeeded
    pub success_count: u64,
    /// Invocations that failed
    pub failure_count: u64,
    /// Running sum of all elapsed times
    pub sum_elapsed: Duration,
    /// Running minimum (Duration::MAX when empty)
    pub min: Duration,
    /// Running maximum (Duration::ZERO when empty)
    pub max: Duration,
    /// Local histogram of latencies (microseconds)
    pub histogram: Histogram<u64>,
}

impl WorkerResult {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            samples: Vec::new(),
            success_count: 0,
            failure_count: 0,
            sum_elapsed: Duration::ZERO,
            min: Duration::MAX,
            max: Duration::ZERO,
            histogram: new_histogram(),
        }
    }

    /// Append one sample and update the running totals
    pub fn record(&mut self, sample: Sample) {
        match sample.outcome {
            Outcome::Success => self.success_count += 1,
            Outcome::Failure => self.failure_count += 1,
        }

        self.sum_elapsed += sample.elapsed;
        self.min = self.min.min(sample.elapsed);
        self.max = self.max.max(sample.elapsed);
        self.samples.push(sample.elapsed);

        let micros = sample.elapsed.as_micros().min(u64::MAX as u128) as u64;
        self.histogram.saturating_record(micros.max(1));
    }

    /// Total invocations recorded
    #[inline]
    pub fn iterations(&self) -> u64 {
        self.samples.len() as u64
    }
}

/// Benchmark worker (runs in dedicated OS thread)
pub struct BenchmarkWorker {
    /// Worker ID
    id: usize,

    /// Shared operation under test
    operation: Arc<dyn Operation>,

    /// Progress collaborator
    progress: Arc<dyn Progress>,

    /// Thread-local accumulation
    result: WorkerResult,
}

impl BenchmarkWorker {
    /// Create new worker
    pub fn new(id: usize, operation: Arc<dyn Operation>, progress: Arc<dyn Progress>) -> Self {
        Self {
            id,
            operation,
            progress,
            result: WorkerResult::new(id),
        }
    }

    /// Main worker loop
    ///
    /// Runs until the stop signal is observed. An invocation already in
    /// flight when the deadline passes is completed and recorded.
    pub fn run(mut self, counters: Arc<GlobalCounters>) -> WorkerResult {
        loop {
            // Check shutdown
            if counters.should_stop() {
                break;
            }

            let start = Instant::now();
            let outcome = match self.operation.execute() {
                Ok(()) => Outcome::Success,
                Err(e) => {
                    if self.result.failure_count < MAX_LOGGED_FAILURES {
                        warn!("Worker {}: operation failed: {}", self.id, e);
                    }
                    Outcome::Failure
                }
            };
            let elapsed = start.elapsed();

            self.result.record(Sample::new(elapsed, outcome));
            counters.record(outcome.is_success());
            self.progress.advance();
        }

        debug!(
            "Worker {}: stopped after {} iterations ({} failed)",
            self.id,
            self.result.iterations(),
            self.result.failure_count
        );

        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::progress::NoProgress;
    use crate::utils::OperationError;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingOperation {
        calls: AtomicU64,
        fail_every: u64,
    }

    impl Operation for CountingOperation {
        fn execute(&self) -> Result<(), OperationError> {
            let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
            if self.fail_every > 0 && n % self.fail_every == 0 {
                Err(OperationError::new("scheduled failure"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_worker_result_record() {
        let mut result = WorkerResult::new(0);
        result.record(Sample::new(Duration::from_millis(5), Outcome::Success));
        result.record(Sample::new(Duration::from_millis(2), Outcome::Failure));
        result.record(Sample::new(Duration::from_millis(9), Outcome::Success));

        assert_eq!(result.iterations(), 3);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.sum_elapsed, Duration::from_millis(16));
        assert_eq!(result.min, Duration::from_millis(2));
        assert_eq!(result.max, Duration::from_millis(9));
        assert_eq!(result.histogram.len(), 3);
    }

    #[test]
    fn test_worker_stops_when_signaled() {
        let counters = Arc::new(GlobalCounters::with_duration(Duration::from_secs(60)));
        counters.signal_shutdown();

        let op = Arc::new(CountingOperation {
            calls: AtomicU64::new(0),
            fail_every: 0,
        });
        let worker = BenchmarkWorker::new(0, op.clone(), Arc::new(NoProgress));
        let result = worker.run(Arc::clone(&counters));

        assert_eq!(result.iterations(), 0);
        assert_eq!(op.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_worker_counts_match_invocations() {
        let counters = Arc::new(GlobalCounters::with_duration(Duration::from_millis(30)));
        let op = Arc::new(CountingOperation {
            calls: AtomicU64::new(0),
            fail_every: 4,
        });

        let worker = BenchmarkWorker::new(7, op.clone(), Arc::new(NoProgress));
        let result = worker.run(Arc::clone(&counters));

        let calls = op.calls.load(Ordering::Relaxed);
        assert!(calls > 0);
        assert_eq!(result.worker_id, 7);
        assert_eq!(result.iterations(), calls);
        assert_eq!(result.success_count + result.failure_count, calls);
        assert_eq!(result.failure_count, calls / 4);

        let (iterations, failures) = counters.progress();
        assert_eq!(iterations, calls);
        assert_eq!(failures, result.failure_count);
    }
}
