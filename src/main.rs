//! loadbench - concurrent load generator and latency benchmark
//!
//! Drives a built-in operation from N worker threads for a fixed duration
//! and prints latency statistics and throughput.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use loadbench::benchmark::{spinner, NoProgress, Progress, Runner};
use loadbench::config::{BenchmarkConfig, CliArgs, OutputFormat};
use loadbench::metrics::MetricsReporter;

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn print_banner(config: &BenchmarkConfig) {
    if config.quiet || config.output_format != OutputFormat::Text {
        return;
    }

    println!("loadbench v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================");
    println!("Workload: {}", config.label());
    println!(
        "Threads: {}, Duration: {:.2}s",
        config.threads,
        config.duration.as_secs_f64()
    );
    println!("====================================\n");
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    // Build configuration
    let config = BenchmarkConfig::from_cli(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    print_banner(&config);

    let runner = Runner::new(config.duration, config.threads)?.with_label(&config.label());
    let operation = config.build_operation()?;

    let progress: Arc<dyn Progress> = if config.quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(spinner(config.duration))
    };
    let runner = runner.with_progress(progress);

    let summary = runner.run(operation)?;

    let reporter = MetricsReporter::new(config.output_format).with_per_worker(config.per_worker);
    reporter.report(&summary);

    // Export to file if requested
    if let Some(ref output_path) = config.output_path {
        info!("Writing results to: {:?}", output_path);
        reporter.write_file(output_path, &summary)?;
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
