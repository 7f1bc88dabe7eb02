//! Finalized run summary

use std::time::Duration;

use serde::Serialize;

use super::accumulator::WorkerSummary;

/// Fixed parameters of a run, echoed in every report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSettings {
    /// Name of the operation being benchmarked
    pub label: String,
    pub threads: usize,
    pub duration_secs: f64,
}

impl RunSettings {
    pub fn new(label: &str, threads: usize, duration: Duration) -> Self {
        Self {
            label: label.to_string(),
            threads,
            duration_secs: duration.as_secs_f64(),
        }
    }
}

/// Statistics of a completed run
///
/// Produced once by the aggregator; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Summary {
    pub settings: RunSettings,
    pub iterations: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    pub median: Duration,
    pub p80: Duration,
    pub p95: Duration,
    pub p99: Duration,
    /// Observed wall-clock span of the run
    pub total_wall_clock: Duration,
    /// Iterations per second of wall clock
    pub throughput: f64,
    pub workers: Vec<WorkerSummary>,
}

impl Summary {
    /// Fraction of invocations that failed (0.0 to 1.0)
    pub fn error_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.failure_count as f64 / self.iterations as f64
        }
    }

    /// Format as single-line summary string
    pub fn one_line(&self) -> String {
        format!(
            "{} | Threads: {} | Iterations: {} | Failed: {} | Throughput: {:.2} ops/sec | p99: {:.3}ms",
            self.settings.label,
            self.settings.threads,
            self.iterations,
            self.failure_count,
            self.throughput,
            as_ms(self.p99)
        )
    }

    /// Convert to JSON object (latencies in milliseconds)
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "settings": serde_json::to_value(&self.settings).unwrap_or(serde_json::Value::Null),
            "iterations": self.iterations,
            "success": self.success_count,
            "failed": self.failure_count,
            "total_time_secs": self.total_wall_clock.as_secs_f64(),
            "throughput": self.throughput,
            "latency": {
                "mean_ms": as_ms(self.mean),
                "min_ms": as_ms(self.min),
                "max_ms": as_ms(self.max),
                "median_ms": as_ms(self.median),
                "p80_ms": as_ms(self.p80),
                "p95_ms": as_ms(self.p95),
                "p99_ms": as_ms(self.p99)
            },
            "workers": self.workers.iter().map(|w| {
                serde_json::json!({
                    "worker_id": w.worker_id,
                    "iterations": w.iterations,
                    "failed": w.failures,
                    "mean_ms": as_ms(w.mean),
                    "p99_ms": as_ms(w.p99_approx),
                    "max_ms": as_ms(w.max)
                })
            }).collect::<Vec<_>>()
        })
    }

    /// CSV header matching [`Summary::to_csv_row`]
    pub fn csv_header() -> &'static str {
        "label,threads,duration_secs,total_time_secs,iterations,success,failed,throughput,mean_ms,min_ms,max_ms,median_ms,p80_ms,p95_ms,p99_ms"
    }

    /// Single CSV row
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{:.3},{:.3},{},{},{},{:.2},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}",
            self.settings.label,
            self.settings.threads,
            self.settings.duration_secs,
            self.total_wall_clock.as_secs_f64(),
            self.iterations,
            self.success_count,
            self.failure_count,
            self.throughput,
            as_ms(self.mean),
            as_ms(self.min),
            as_ms(self.max),
            as_ms(self.median),
            as_ms(self.p80),
            as_ms(self.p95),
            as_ms(self.p99)
        )
    }
}

/// Duration as fractional milliseconds
pub fn as_ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}
