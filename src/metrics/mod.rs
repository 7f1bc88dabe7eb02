//! Metrics collection and reporting
//!
//! This module provides:
//! - Merging of per-worker sample buffers into one run result
//! - Post-run statistics (sort, median, nearest-rank percentiles)
//! - Text/JSON/CSV export

pub mod accumulator;
pub mod aggregator;
pub mod reporter;
pub mod summary;

pub use accumulator::{RunResult, WorkerSummary};
pub use aggregator::{median, percentile, sorted_samples, Aggregator};
pub use reporter::{format_count, format_throughput, MetricsReporter};
pub use summary::{RunSettings, Summary};
