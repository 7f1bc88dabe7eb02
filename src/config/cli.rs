//! Command-line argument parsing
//!
//! Arguments are grouped by category for clarity.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::workload::WorkloadType;

/// Concurrent load generator and latency benchmark
#[derive(Parser, Debug, Clone)]
#[command(name = "loadbench")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    // ===== Run Parameters =====
    /// Run duration in seconds (fractions allowed)
    #[arg(short = 'd', long = "duration", default_value_t = 10.0, allow_negative_numbers = true)]
    pub duration_secs: f64,

    /// Number of worker threads (default: available parallelism)
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,

    // ===== Workload Selection =====
    /// Operation to benchmark
    #[arg(short = 'w', long = "workload", value_enum, default_value_t = WorkloadType::Sleep)]
    pub workload: WorkloadType,

    /// Fixed latency of the sleep workload in milliseconds
    #[arg(long = "latency-ms", default_value_t = 10.0)]
    pub latency_ms: f64,

    /// Maximum extra random latency of the sleep workload in milliseconds
    #[arg(long = "jitter-ms", default_value_t = 0.0)]
    pub jitter_ms: f64,

    /// Probability (0.0 - 1.0) that a sleep invocation fails
    #[arg(long = "fail-rate", default_value_t = 0.0)]
    pub fail_rate: f64,

    /// Loop iterations per invocation of the spin workload
    #[arg(long = "spin-iterations", default_value_t = 100_000)]
    pub spin_iterations: u64,

    /// Target address for the tcp-connect workload (host:port)
    #[arg(long = "target")]
    pub target: Option<String>,

    /// Connection timeout in milliseconds
    #[arg(long = "connect-timeout-ms", default_value_t = 1000)]
    pub connect_timeout_ms: u64,

    /// Command to run for the exec workload (after --)
    #[arg(last = true)]
    pub command: Vec<String>,

    // ===== Output Options =====
    /// Output format
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Also write the report to this file
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Show per-worker breakdown
    #[arg(long = "per-worker")]
    pub per_worker: bool,

    /// Quiet mode (no progress bar, errors only)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format for results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(format!(
                "--duration must be a positive number of seconds, got {}",
                self.duration_secs
            ));
        }

        if self.threads == Some(0) {
            return Err("--threads must be at least 1".to_string());
        }

        if !(0.0..=1.0).contains(&self.fail_rate) {
            return Err("--fail-rate must be between 0.0 and 1.0".to_string());
        }

        if !self.latency_ms.is_finite() || self.latency_ms < 0.0 {
            return Err("--latency-ms must not be negative".to_string());
        }

        if !self.jitter_ms.is_finite() || self.jitter_ms < 0.0 {
            return Err("--jitter-ms must not be negative".to_string());
        }

        match self.workload {
            WorkloadType::TcpConnect if self.target.is_none() => {
                return Err("tcp-connect workload requires --target".to_string());
            }
            WorkloadType::Exec if self.command.is_empty() => {
                return Err("exec workload requires a command after --".to_string());
            }
            _ => {}
        }

        if self.connect_timeout_ms == 0 {
            return Err("--connect-timeout-ms must be at least 1".to_string());
        }

        Ok(())
    }

    /// Get effective number of threads (unset = auto-detect)
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        })
    }
}
