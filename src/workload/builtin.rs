//! Built-in operations for the command-line front end
//!
//! Each type implements [`Operation`] and is safe to share across worker
//! threads. Per-invocation randomness comes from `fastrand`'s thread-local
//! generator, so no state is shared between workers.

use std::hint::black_box;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use super::operation::Operation;
use crate::utils::{BenchmarkError, OperationError, Result};

/// Sleeps for a fixed latency plus uniform jitter, failing at a configured rate
#[derive(Debug, Clone)]
pub struct SleepOperation {
    latency: Duration,
    jitter: Duration,
    fail_rate: f64,
}

impl SleepOperation {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            jitter: Duration::ZERO,
            fail_rate: 0.0,
        }
    }

    /// Add up to `jitter` of extra uniformly distributed latency
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Fail each invocation with probability `rate` (clamped to 0.0..=1.0)
    pub fn with_fail_rate(mut self, rate: f64) -> Self {
        self.fail_rate = rate.clamp(0.0, 1.0);
        self
    }
}

impl Operation for SleepOperation {
    fn execute(&self) -> std::result::Result<(), OperationError> {
        let extra = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            let jitter_ns = self.jitter.as_nanos().min(u64::MAX as u128) as u64;
            Duration::from_nanos(fastrand::u64(0..=jitter_ns))
        };
        thread::sleep(self.latency + extra);

        if self.fail_rate > 0.0 && fastrand::f64() < self.fail_rate {
            return Err(OperationError::new("injected failure"));
        }
        Ok(())
    }
}

/// CPU-bound busy loop
#[derive(Debug, Clone)]
pub struct SpinOperation {
    iterations: u64,
}

impl SpinOperation {
    pub fn new(iterations: u64) -> Self {
        Self { iterations }
    }
}

impl Operation for SpinOperation {
    fn execute(&self) -> std::result::Result<(), OperationError> {
        let mut acc = 0u64;
        for i in 0..self.iterations {
            acc = black_box(acc.wrapping_mul(31).wrapping_add(i));
        }
        black_box(acc);
        Ok(())
    }
}

/// Opens a TCP connection to a fixed address and drops it
#[derive(Debug, Clone)]
pub struct TcpConnectOperation {
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpConnectOperation {
    /// Resolve `target` once; an unresolvable target is a configuration error
    pub fn new(target: &str, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(BenchmarkError::Config(
                "connect timeout must be greater than zero".to_string(),
            ));
        }

        let addr = target
            .to_socket_addrs()
            .map_err(|e| BenchmarkError::Config(format!("Cannot resolve {}: {}", target, e)))?
            .next()
            .ok_or_else(|| {
                BenchmarkError::Config(format!("No addresses found for {}", target))
            })?;

        Ok(Self { addr, timeout })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Operation for TcpConnectOperation {
    fn execute(&self) -> std::result::Result<(), OperationError> {
        let stream = TcpStream::connect_timeout(&self.addr, self.timeout)?;
        drop(stream);
        Ok(())
    }
}

/// Spawns an external program and waits for it to exit
///
/// A non-zero exit status counts as a failure.
#[derive(Debug, Clone)]
pub struct CommandOperation {
    program: String,
    args: Vec<String>,
}

impl CommandOperation {
    pub fn new(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            BenchmarkError::Config("exec workload requires a command after --".to_string())
        })?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Operation for CommandOperation {
    fn execute(&self) -> std::result::Result<(), OperationError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(OperationError::new(format!(
                "{} exited with {}",
                self.program, status
            )))
        }
    }
}
