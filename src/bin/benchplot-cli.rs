use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use benchplot::config::{
    DEFAULT_DPI, DEFAULT_INPUT, DEFAULT_LATENCY_BENCHMARK, DEFAULT_LATENCY_OUTPUT,
    DEFAULT_THROUGHPUT_BENCHMARK, DEFAULT_THROUGHPUT_OUTPUT,
};
use benchplot::{
    log, run_report, ChartKind, ChartOutcome, ChartStyle, ReportConfig, ReportOutcome,
};

/// Chart latency and throughput from `go test -bench` output.
#[derive(Debug, Parser)]
#[command(name = "benchplot", version)]
struct Cli {
    /// Benchmark results file to read
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Where to write the latency box plot
    #[arg(long, default_value = DEFAULT_LATENCY_OUTPUT)]
    latency_output: PathBuf,

    /// Where to write the throughput bar chart
    #[arg(long, default_value = DEFAULT_THROUGHPUT_OUTPUT)]
    throughput_output: PathBuf,

    /// Benchmark plotted in the latency chart
    #[arg(long, default_value = DEFAULT_LATENCY_BENCHMARK)]
    latency_benchmark: String,

    /// Benchmark plotted in the throughput chart
    #[arg(long, default_value = DEFAULT_THROUGHPUT_BENCHMARK)]
    throughput_benchmark: String,

    /// Image resolution; the canvas is always 8x6 inches
    #[arg(long, default_value_t = DEFAULT_DPI, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<Cli> for ReportConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            latency_output: cli.latency_output,
            throughput_output: cli.throughput_output,
            latency_benchmark: cli.latency_benchmark,
            throughput_benchmark: cli.throughput_benchmark,
            style: ChartStyle {
                dpi: cli.dpi,
                ..ChartStyle::default()
            },
        }
    }
}

fn print_outcome(kind: ChartKind, outcome: &ChartOutcome) {
    match outcome {
        ChartOutcome::Written(path) => println!("Saved {kind} chart to {}", path.display()),
        ChartOutcome::Skipped(skipped) => println!("{skipped}"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    log::init_logger(cli.verbose);
    let config = ReportConfig::from(cli);

    let outcome = run_report(&config)
        .with_context(|| format!("benchmark report for {} failed", config.input.display()))?;

    match outcome {
        ReportOutcome::NoData => {
            println!(
                "No benchmark data was found in {}.",
                config.input.display()
            );
        }
        ReportOutcome::Rendered(report) => {
            print_outcome(ChartKind::Latency, &report.latency);
            print_outcome(ChartKind::Throughput, &report.throughput);
        }
    }

    Ok(())
}
