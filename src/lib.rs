//! loadbench library
//!
//! Concurrent load generator and latency benchmark harness: drives any
//! [`workload::Operation`] from a fixed number of worker threads for a fixed
//! duration and reports latency statistics and throughput.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use loadbench::benchmark::Runner;
//!
//! let runner = Runner::new(Duration::from_secs(5), 8)?.with_label("ping");
//! let summary = runner.run(Arc::new(|| -> Result<(), std::io::Error> {
//!     std::net::TcpStream::connect("127.0.0.1:6379").map(drop)
//! }))?;
//! println!("{}", summary.one_line());
//! # Ok::<(), loadbench::utils::BenchmarkError>(())
//! ```

pub mod benchmark;
pub mod config;
pub mod metrics;
pub mod utils;
pub mod workload;
