//! Benchmark configuration derived from CLI arguments

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::cli::{CliArgs, OutputFormat};
use crate::utils::Result;
use crate::workload::{
    CommandOperation, Operation, SleepOperation, SpinOperation, TcpConnectOperation,
    WorkloadType,
};

/// Parameters of the selected built-in operation
#[derive(Debug, Clone, PartialEq)]
pub enum WorkloadSpec {
    Sleep {
        latency: Duration,
        jitter: Duration,
        fail_rate: f64,
    },
    Spin {
        iterations: u64,
    },
    TcpConnect {
        target: String,
        timeout: Duration,
    },
    Exec {
        argv: Vec<String>,
    },
}

impl WorkloadSpec {
    pub fn workload_type(&self) -> WorkloadType {
        match self {
            Self::Sleep { .. } => WorkloadType::Sleep,
            Self::Spin { .. } => WorkloadType::Spin,
            Self::TcpConnect { .. } => WorkloadType::TcpConnect,
            Self::Exec { .. } => WorkloadType::Exec,
        }
    }
}

/// Complete benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    // Run
    pub duration: Duration,
    pub threads: usize,

    // Workload
    pub workload: WorkloadSpec,

    // Output
    pub output_path: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub per_worker: bool,
    pub quiet: bool,
}

impl BenchmarkConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> std::result::Result<Self, String> {
        // Validate first
        args.validate()?;

        let workload = match args.workload {
            WorkloadType::Sleep => WorkloadSpec::Sleep {
                latency: millis_f64(args.latency_ms),
                jitter: millis_f64(args.jitter_ms),
                fail_rate: args.fail_rate,
            },
            WorkloadType::Spin => WorkloadSpec::Spin {
                iterations: args.spin_iterations,
            },
            WorkloadType::TcpConnect => WorkloadSpec::TcpConnect {
                target: args.target.clone().unwrap_or_default(),
                timeout: Duration::from_millis(args.connect_timeout_ms),
            },
            WorkloadType::Exec => WorkloadSpec::Exec {
                argv: args.command.clone(),
            },
        };

        let duration = Duration::try_from_secs_f64(args.duration_secs)
            .map_err(|_| format!("--duration {} is out of range", args.duration_secs))?;

        Ok(Self {
            duration,
            threads: args.effective_threads(),
            workload,
            output_path: args.output.clone(),
            output_format: args.output_format,
            per_worker: args.per_worker,
            quiet: args.quiet,
        })
    }

    /// Display label for the configured workload
    pub fn label(&self) -> String {
        let detail = match &self.workload {
            WorkloadSpec::Sleep { latency, .. } => format!("{:?}", latency),
            WorkloadSpec::Spin { iterations } => iterations.to_string(),
            WorkloadSpec::TcpConnect { target, .. } => target.clone(),
            WorkloadSpec::Exec { argv } => argv.join(" "),
        };
        format!("{} {}", self.workload.workload_type(), detail)
    }

    /// Instantiate the configured operation
    pub fn build_operation(&self) -> Result<Arc<dyn Operation>> {
        let op: Arc<dyn Operation> = match &self.workload {
            WorkloadSpec::Sleep {
                latency,
                jitter,
                fail_rate,
            } => Arc::new(
                SleepOperation::new(*latency)
                    .with_jitter(*jitter)
                    .with_fail_rate(*fail_rate),
            ),
            WorkloadSpec::Spin { iterations } => Arc::new(SpinOperation::new(*iterations)),
            WorkloadSpec::TcpConnect { target, timeout } => {
                Arc::new(TcpConnectOperation::new(target, *timeout)?)
            }
            WorkloadSpec::Exec { argv } => Arc::new(CommandOperation::new(argv)?),
        };
        Ok(op)
    }
}

/// Convert fractional milliseconds to a Duration, rounded to the nanosecond
fn millis_f64(ms: f64) -> Duration {
    Duration::from_nanos((ms * 1_000_000.0).round() as u64)
}
