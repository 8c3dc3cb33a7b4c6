//! Turn `go test -bench` output into latency and throughput charts.
//!
//! The pipeline is linear: [`parse_benchmark_results`] reads the log into a
//! [`Dataset`], then each chart filters that dataset by benchmark name and is
//! either written as a PNG or skipped when there is nothing to plot.

use std::{io, path::PathBuf};

use thiserror::Error;
use tracing::info;

pub mod chart;
pub mod config;
pub mod log;
pub mod parser;
pub mod stats;
#[cfg(test)]
mod test_utils;

pub use chart::{
    format_thousands, render_latency_chart, render_throughput_chart, ChartKind, ChartOutcome,
    LatencyChart, SkipReason, SkippedChart, ThroughputChart,
};
pub use config::{ChartStyle, ReportConfig};
pub use parser::{parse_benchmark_results, parse_line, BenchmarkRecord, Dataset};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to render {}: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

/// Results of a run that found at least one benchmark record.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub records: usize,
    pub latency: ChartOutcome,
    pub throughput: ChartOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// The input had no matching lines; no chart was attempted.
    NoData,
    Rendered(Report),
}

/// Parse the configured input, then render the latency and throughput charts
/// in that order.
///
/// A chart whose benchmark is absent from the log is skipped without affecting
/// the other one. Only I/O and drawing failures are errors.
pub fn run_report(config: &ReportConfig) -> Result<ReportOutcome, ReportError> {
    let dataset = parse_benchmark_results(&config.input)?;
    if dataset.is_empty() {
        info!(input = %config.input.display(), "no benchmark records found");
        return Ok(ReportOutcome::NoData);
    }

    let latency = render_latency_chart(&dataset, config)?;
    let throughput = render_throughput_chart(&dataset, config)?;

    Ok(ReportOutcome::Rendered(Report {
        records: dataset.len(),
        latency,
        throughput,
    }))
}
