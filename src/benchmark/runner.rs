//! Benchmark runner
//!
//! Owns the lifecycle of one run: spawns the worker threads, waits for the
//! deadline, signals shutdown, joins every worker and hands the merged
//! samples to the aggregator.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::counters::GlobalCounters;
use super::progress::{NoProgress, Progress};
use super::worker::{BenchmarkWorker, WorkerResult};
use crate::metrics::{Aggregator, RunResult, RunSettings, Summary};
use crate::utils::{BenchmarkError, Result};
use crate::workload::Operation;

/// Raw outcome of a run before statistics are computed
#[derive(Debug)]
pub struct RawRun {
    /// Merged worker buffers
    pub result: RunResult,
    /// Span from first spawn to last join
    pub wall_clock: Duration,
    /// Iterations counted by the shared atomic counters
    pub live_iterations: u64,
}

/// Fixed-duration, fixed-concurrency benchmark runner
pub struct Runner {
    duration: Duration,
    threads: usize,
    label: String,
    progress: Arc<dyn Progress>,
}

impl Runner {
    /// Create a runner for `threads` workers over `duration`
    pub fn new(duration: Duration, threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(BenchmarkError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }
        if duration.is_zero() {
            return Err(BenchmarkError::Config(
                "run duration must be greater than zero".to_string(),
            ));
        }
        if Instant::now().checked_add(duration).is_none() {
            return Err(BenchmarkError::Config(format!(
                "run duration {:?} is out of range",
                duration
            )));
        }

        Ok(Self {
            duration,
            threads,
            label: "operation".to_string(),
            progress: Arc::new(NoProgress),
        })
    }

    /// Name shown in reports
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Progress collaborator notified once per sample
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run the benchmark and compute its statistics
    pub fn run(&self, operation: Arc<dyn Operation>) -> Result<Summary> {
        let raw = self.execute(operation)?;
        let settings = RunSettings::new(&self.label, self.threads, self.duration);
        Aggregator::finalize(raw.result, raw.wall_clock, settings)
    }

    /// Run the benchmark and return the merged samples without aggregating
    pub fn execute(&self, operation: Arc<dyn Operation>) -> Result<RawRun> {
        info!(
            "Starting {}: {} workers for {:.2}s",
            self.label,
            self.threads,
            self.duration.as_secs_f64()
        );

        let counters = Arc::new(GlobalCounters::with_duration(self.duration));
        let start_time = Instant::now();

        let mut handles: Vec<JoinHandle<WorkerResult>> = Vec::with_capacity(self.threads);
        for worker_id in 0..self.threads {
            let worker = BenchmarkWorker::new(
                worker_id,
                Arc::clone(&operation),
                Arc::clone(&self.progress),
            );
            let c = Arc::clone(&counters);

            let spawned = thread::Builder::new()
                .name(format!("worker-{}", worker_id))
                .spawn(move || worker.run(c));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Stop and reap whatever already started before bailing out
                    counters.signal_shutdown();
                    let _ = Self::join_workers(handles);
                    return Err(BenchmarkError::Io(e));
                }
            }
        }

        // Block until the deadline
        while !counters.is_deadline_exceeded() {
            thread::sleep(counters.remaining());
        }
        counters.signal_shutdown();
        debug!("Deadline reached, waiting for {} workers", handles.len());

        let results = Self::join_workers(handles)?;
        let wall_clock = start_time.elapsed();
        self.progress.finish();

        let (live_iterations, live_failures) = counters.progress();
        info!(
            "All workers stopped after {:.3}s: {} iterations, {} failed",
            wall_clock.as_secs_f64(),
            live_iterations,
            live_failures
        );

        Ok(RawRun {
            result: RunResult::from_workers(results),
            wall_clock,
            live_iterations,
        })
    }

    /// Join every worker, reporting the first panic after all have been reaped
    fn join_workers(handles: Vec<JoinHandle<WorkerResult>>) -> Result<Vec<WorkerResult>> {
        let mut results = Vec::with_capacity(handles.len());
        let mut panicked = Vec::new();

        for (worker_id, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(result) => results.push(result),
                Err(_) => panicked.push(worker_id),
            }
        }

        if panicked.is_empty() {
            Ok(results)
        } else {
            Err(BenchmarkError::Worker(format!(
                "worker thread(s) {:?} panicked",
                panicked
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::OperationError;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FixedLatency(Duration);

    impl Operation for FixedLatency {
        fn execute(&self) -> std::result::Result<(), OperationError> {
            thread::sleep(self.0);
            Ok(())
        }
    }

    struct CountingProgress(AtomicU64);

    impl Progress for CountingProgress {
        fn advance(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_rejects_zero_workers() {
        assert!(matches!(
            Runner::new(Duration::from_secs(1), 0),
            Err(BenchmarkError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_zero_duration() {
        assert!(matches!(
            Runner::new(Duration::ZERO, 4),
            Err(BenchmarkError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_unrepresentable_duration() {
        assert!(matches!(
            Runner::new(Duration::MAX, 1),
            Err(BenchmarkError::Config(_))
        ));
    }

    #[test]
    fn test_single_worker_fixed_latency() {
        let runner = Runner::new(Duration::from_millis(200), 1).unwrap();
        let summary = runner
            .run(Arc::new(FixedLatency(Duration::from_millis(10))))
            .unwrap();

        // At most duration / latency, plus the one invocation in flight at the deadline
        assert!(summary.iterations >= 10, "iterations: {}", summary.iterations);
        assert!(summary.iterations <= 21, "iterations: {}", summary.iterations);
        assert_eq!(summary.failure_count, 0);
        assert!(summary.min >= Duration::from_millis(10));
        assert!(summary.median >= Duration::from_millis(10));
        assert!(summary.total_wall_clock >= Duration::from_millis(200));
        assert!(summary.throughput > 0.0);
    }

    #[test]
    fn test_always_failing_operation() {
        let runner = Runner::new(Duration::from_millis(50), 2).unwrap();
        let op = || -> std::result::Result<(), String> {
            thread::sleep(Duration::from_millis(1));
            Err("always".to_string())
        };

        let summary = runner.run(Arc::new(op)).unwrap();
        assert!(summary.iterations > 0);
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.failure_count, summary.iterations);
    }

    #[test]
    fn test_no_sample_lost_under_contention() {
        let calls = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&calls);
        let op = move || -> std::result::Result<(), String> {
            let n = c.fetch_add(1, Ordering::Relaxed);
            if n % 7 == 0 {
                Err("every seventh".to_string())
            } else {
                Ok(())
            }
        };

        let progress = Arc::new(CountingProgress(AtomicU64::new(0)));
        let runner = Runner::new(Duration::from_millis(100), 8)
            .unwrap()
            .with_progress(progress.clone());
        let raw = runner.execute(Arc::new(op)).unwrap();

        let invoked = calls.load(Ordering::Relaxed);
        assert!(invoked > 0);
        assert_eq!(raw.result.iteration_count(), invoked);
        assert_eq!(raw.live_iterations, invoked);
        assert_eq!(progress.0.load(Ordering::Relaxed), invoked);
        assert!(raw.result.is_consistent());
        assert_eq!(raw.result.workers.len(), 8);

        let per_worker: u64 = raw.result.workers.iter().map(|w| w.iterations).sum();
        assert_eq!(per_worker, invoked);
    }

    #[test]
    fn test_concurrency_scales_iterations() {
        let latency = Duration::from_millis(5);
        let duration = Duration::from_millis(200);

        let single = Runner::new(duration, 1)
            .unwrap()
            .run(Arc::new(FixedLatency(latency)))
            .unwrap();
        let eight = Runner::new(duration, 8)
            .unwrap()
            .run(Arc::new(FixedLatency(latency)))
            .unwrap();

        let ratio = eight.iterations as f64 / single.iterations as f64;
        assert!(ratio > 3.0 && ratio < 16.0, "ratio: {}", ratio);
        assert_eq!(eight.workers.len(), 8);
        assert!(eight.workers.iter().all(|w| w.iterations > 0));
    }

    #[test]
    fn test_workers_stop_at_deadline() {
        let runner = Runner::new(Duration::from_millis(50), 4).unwrap();
        let start = Instant::now();
        let raw = runner
            .execute(Arc::new(FixedLatency(Duration::from_millis(20))))
            .unwrap();

        // One in-flight invocation may finish after the deadline, no more
        assert!(start.elapsed() < Duration::from_millis(50 + 20 + 500));
        assert!(raw.wall_clock >= Duration::from_millis(50));
        assert!(raw.result.iteration_count() <= 4 * (50 / 20 + 1));
    }

    #[test]
    fn test_panicking_operation_is_worker_error() {
        let runner = Runner::new(Duration::from_millis(20), 2).unwrap();
        let op = || -> std::result::Result<(), String> { panic!("operation panicked") };

        assert!(matches!(
            runner.run(Arc::new(op)),
            Err(BenchmarkError::Worker(_))
        ));
    }

    #[test]
    fn test_label_in_settings() {
        let summary = Runner::new(Duration::from_millis(20), 1)
            .unwrap()
            .with_label("noop")
            .run(Arc::new(|| -> std::result::Result<(), String> { Ok(()) }))
            .unwrap();

        assert_eq!(summary.settings.label, "noop");
        assert_eq!(summary.settings.threads, 1);
    }
}
