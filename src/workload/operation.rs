//! The unit of work driven by the benchmark workers

use std::fmt;
use std::time::Duration;

use crate::utils::OperationError;

/// A side-effecting unit of work invoked repeatedly by every worker.
///
/// The same instance is shared by all worker threads and invoked concurrently,
/// hence the `Send + Sync` bound. An `Err` is an expected outcome: it is
/// recorded as a failed sample and the worker moves on.
pub trait Operation: Send + Sync {
    fn execute(&self) -> Result<(), OperationError>;
}

impl<F, E> Operation for F
where
    F: Fn() -> Result<(), E> + Send + Sync,
    E: fmt::Display,
{
    #[inline]
    fn execute(&self) -> Result<(), OperationError> {
        (self)().map_err(|e| OperationError::new(e.to_string()))
    }
}

/// Outcome of a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// One observation: how long a single invocation took and how it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub elapsed: Duration,
    pub outcome: Outcome,
}

impl Sample {
    pub fn new(elapsed: Duration, outcome: Outcome) -> Self {
        Self { elapsed, outcome }
    }
}
