//! Error types for loadbench

use std::io;
use thiserror::Error;

/// Top-level harness error
///
/// These are structural failures: they abort a run and suppress the report.
/// Failures of the benchmarked operation itself are never surfaced here.
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No samples collected: the run ended before any invocation completed")]
    NoSamples,

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failure reported by a single operation invocation
///
/// Recorded as a failed sample and counted, never propagated to the runner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct OperationError {
    message: String,
}

impl OperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for OperationError {
    fn from(err: io::Error) -> Self {
        Self::new(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BenchmarkError>;
