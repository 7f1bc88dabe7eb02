//! Metrics reporter - output formatting and export
//!
//! Supports multiple output formats:
//! - Text (human-readable)
//! - JSON
//! - CSV

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use super::summary::{as_ms, Summary};
use crate::config::OutputFormat;

/// Metrics reporter
pub struct MetricsReporter {
    format: OutputFormat,
    per_worker: bool,
}

impl MetricsReporter {
    /// Create new reporter with specified format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            per_worker: false,
        }
    }

    /// Include the per-worker table in text output
    pub fn with_per_worker(mut self, per_worker: bool) -> Self {
        self.per_worker = per_worker;
        self
    }

    /// Render the summary in the configured format
    pub fn render(&self, summary: &Summary) -> String {
        match self.format {
            OutputFormat::Text => self.render_text(summary),
            OutputFormat::Json => render_json(summary),
            OutputFormat::Csv => format!("{}\n{}\n", Summary::csv_header(), summary.to_csv_row()),
        }
    }

    /// Report summary to stdout
    pub fn report(&self, summary: &Summary) {
        print!("{}", self.render(summary));
    }

    /// Write the rendered summary to a file
    pub fn write_file(&self, path: &Path, summary: &Summary) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render(summary).as_bytes())?;
        file.flush()
    }

    fn render_text(&self, summary: &Summary) -> String {
        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "=== {} ===", summary.settings.label);
        let _ = writeln!(out, "Avg time:     {:?}", summary.mean);
        let _ = writeln!(out, "Min time:     {:?}", summary.min);
        let _ = writeln!(out, "Max time:     {:?}", summary.max);
        let _ = writeln!(out, "Median time:  {:?}", summary.median);
        let _ = writeln!(out, "p80 time:     {:?}", summary.p80);
        let _ = writeln!(out, "p95 time:     {:?}", summary.p95);
        let _ = writeln!(out, "p99 time:     {:?}", summary.p99);
        let _ = writeln!(out, "Total time:   {:.3}s", summary.total_wall_clock.as_secs_f64());
        let _ = writeln!(out, "Success:      {}", format_count(summary.success_count));
        let _ = writeln!(out, "Failed:       {}", format_count(summary.failure_count));
        let _ = writeln!(out, "Iterations:   {}", format_count(summary.iterations));
        let _ = writeln!(out, "Throughput:   {} ops/s", format_throughput(summary.throughput));

        if self.per_worker && !summary.workers.is_empty() {
            let _ = writeln!(out, "\nPer-worker:");
            let _ = writeln!(
                out,
                "{:>8} {:>12} {:>10} {:>12} {:>12} {:>12}",
                "Worker", "Iterations", "Failed", "Avg (ms)", "p99 (ms)", "Max (ms)"
            );
            let _ = writeln!(out, "{}", "-".repeat(71));
            for w in &summary.workers {
                let _ = writeln!(
                    out,
                    "{:>8} {:>12} {:>10} {:>12.3} {:>12.3} {:>12.3}",
                    w.worker_id,
                    format_count(w.iterations),
                    format_count(w.failures),
                    as_ms(w.mean),
                    as_ms(w.p99_approx),
                    as_ms(w.max)
                );
            }
        }

        out
    }
}

fn render_json(summary: &Summary) -> String {
    match serde_json::to_string_pretty(&summary.to_json()) {
        Ok(s) => format!("{}\n", s),
        Err(e) => error_json(&e.to_string()),
    }
}

/// JSON document carrying only an error message
fn error_json(message: &str) -> String {
    format!("{}\n", serde_json::json!({ "error": message }))
}

/// Format throughput without meaningless decimals
/// Examples: 1,234,567 or 987,654
pub fn format_throughput(throughput: f64) -> String {
    format_count(throughput as u64)
}

/// Format large numbers with thousands separators
/// Examples: 1,234,567 or 987,654
pub fn format_count(value: u64) -> String {
    let s = value.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
