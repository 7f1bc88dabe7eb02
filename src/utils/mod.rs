//! Utility modules

pub mod error;

pub use error::{BenchmarkError, OperationError, Result};
