//! Workload type definitions

use std::fmt;

use clap::ValueEnum;

/// Built-in operations selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkloadType {
    /// Sleep for a fixed latency (plus optional jitter)
    #[default]
    Sleep,
    /// CPU-bound busy loop
    Spin,
    /// Open and close a TCP connection
    TcpConnect,
    /// Spawn an external command and wait for it
    Exec,
}

impl WorkloadType {
    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "SLEEP",
            Self::Spin => "SPIN",
            Self::TcpConnect => "TCP_CONNECT",
            Self::Exec => "EXEC",
        }
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
