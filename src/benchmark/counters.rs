//! Global atomic counters for thread synchronization
//!
//! These are the ONLY synchronization points between worker threads.
//! Sample buffers are thread-local and merged after the workers are joined.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Global counters shared between all worker threads
///
/// Counters use relaxed ordering: they are only read for live progress while
/// the run is in flight. Exact totals come from the joined worker results.
pub struct GlobalCounters {
    /// Total invocations completed
    pub iterations: AtomicU64,

    /// Invocations that returned Ok
    pub success_count: AtomicU64,

    /// Invocations that returned Err
    pub failure_count: AtomicU64,

    /// Stop signal
    pub shutdown: AtomicBool,

    /// Wall-clock deadline after which no new invocation may start
    deadline: Instant,
}

impl GlobalCounters {
    /// Create counters for a run ending `duration` from now
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            iterations: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
            deadline: Instant::now() + duration,
        }
    }

    /// Time left until the deadline (zero once it has passed)
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Check if the deadline has passed
    #[inline]
    pub fn is_deadline_exceeded(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Non-blocking stop check performed by workers before every invocation
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.is_shutdown() || self.is_deadline_exceeded()
    }

    /// Record one completed invocation
    #[inline]
    pub fn record(&self, success: bool) {
        if success {
            self.success_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
        self.iterations.fetch_add(1, Ordering::Relaxed);
    }

    /// Signal shutdown to all workers
    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown has been signaled
    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Get current progress as (iterations, failures)
    pub fn progress(&self) -> (u64, u64) {
        (
            self.iterations.load(Ordering::Relaxed),
            self.failure_count.load(Ordering::Relaxed),
        )
    }

    /// Get success count
    pub fn successes(&self) -> u64 {
        self.success_count.load(Ordering::Relaxed)
    }

    /// Get failure count
    pub fn failures(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }
}
