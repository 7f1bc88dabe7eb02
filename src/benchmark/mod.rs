//! Benchmark runner and workers
//!
//! This module provides the multi-threaded benchmark execution system:
//! - GlobalCounters: Atomic counters and the deadline-bearing stop signal
//! - BenchmarkWorker: Tight invoke-and-record loop on a dedicated thread
//! - Runner: Spawns workers, waits for the deadline and collects results
//! - Progress: Per-sample progress notifications

pub mod counters;
pub mod progress;
pub mod runner;
pub mod worker;

pub use counters::GlobalCounters;
pub use progress::{spinner, NoProgress, Progress};
pub use runner::{RawRun, Runner};
pub use worker::{BenchmarkWorker, WorkerResult};
