//! PNG rendering of the parsed benchmark data.
//!
//! Each chart is built in two steps: the plot data is derived from a
//! [`Dataset`](crate::parser::Dataset) first, then drawn onto a bitmap. Keeping the
//! two apart lets the plot data be inspected without touching the filesystem.

use std::{error::Error, fmt, path::Path, path::PathBuf};

use crate::ReportError;

pub mod latency;
pub mod throughput;

pub use latency::{render_latency_chart, LatencyChart};
pub use throughput::{render_throughput_chart, ThroughputChart};

const FONT_FAMILY: &str = "sans-serif";
const TITLE_POINTS: f64 = 16.0;
const AXIS_DESC_POINTS: f64 = 12.0;
const TICK_LABEL_POINTS: f64 = 10.0;
/// Gap between the title and the plot area.
const TITLE_PAD_POINTS: f64 = 20.0;

/// Which of the two charts an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Latency,
    Throughput,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Latency => write!(f, "latency"),
            ChartKind::Throughput => write!(f, "throughput"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No record carried the benchmark name.
    NoRecords,
    /// Records exist but none has a latency that converts to a finite QPS.
    NoPositiveLatency,
    /// The mean rate is finite but leaves no room for a finite y axis above it.
    RateTooLarge,
}

/// A chart that was not drawn because its benchmark had nothing to plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedChart {
    pub kind: ChartKind,
    pub benchmark: String,
    pub reason: SkipReason,
}

impl SkippedChart {
    pub fn new(kind: ChartKind, benchmark: &str, reason: SkipReason) -> Self {
        Self {
            kind,
            benchmark: benchmark.to_string(),
            reason,
        }
    }
}

impl fmt::Display for SkippedChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            SkipReason::NoRecords => write!(
                f,
                "No data found for '{}'. Skipping {} chart.",
                self.benchmark, self.kind
            ),
            SkipReason::NoPositiveLatency => write!(
                f,
                "No positive latency samples for '{}'. Skipping {} chart.",
                self.benchmark, self.kind
            ),
            SkipReason::RateTooLarge => write!(
                f,
                "Mean throughput for '{}' is too large to plot. Skipping {} chart.",
                self.benchmark, self.kind
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    Written(PathBuf),
    Skipped(SkippedChart),
}

impl ChartOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, ChartOutcome::Written(_))
    }
}

/// Format `value` rounded to a whole number with `,` between thousands groups.
///
/// Ties round to even, so `2.5` prints as `2` and `3.5` as `4`.
pub fn format_thousands(value: f64) -> String {
    let formatted = format!("{value:.0}");
    let (negative, digits) = match formatted.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, formatted.as_str()),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Pad a `[low, high]` data range so that nothing sits on the plot border.
fn padded_range(low: f64, high: f64) -> (f64, f64) {
    let span = high - low;
    let pad = if span > 0.0 {
        span * 0.1
    } else {
        low.abs().max(1.0) * 0.05
    };
    (low - pad, high + pad)
}

fn render_error(path: &Path, err: Box<dyn Error>) -> ReportError {
    ReportError::Render {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
