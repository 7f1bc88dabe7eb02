//! Progress reporting collaborator
//!
//! Workers call [`Progress::advance`] once per recorded sample. The method is
//! infallible so a misbehaving display can never abort a run.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives one notification per completed invocation
pub trait Progress: Send + Sync {
    /// Record that one unit of work completed
    fn advance(&self);

    /// Called once by the runner after all workers have stopped
    fn finish(&self) {}
}

/// Progress sink that discards every notification (quiet mode)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    #[inline]
    fn advance(&self) {}
}

impl Progress for ProgressBar {
    #[inline]
    fn advance(&self) {
        self.inc(1);
    }

    fn finish(&self) {
        self.finish_with_message(format!("done - {} total ops", self.position()));
    }
}

/// Build the spinner used by the command-line front end
///
/// Length is unknown up front (the run is bounded by time, not by count), so
/// this shows a spinner with the running count and rate.
pub fn spinner(duration: Duration) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {pos} ops ({per_sec}) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(format!("running for {:.1}s", duration.as_secs_f64()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
