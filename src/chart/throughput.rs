use std::{error::Error, path::Path};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, info};

use super::{
    format_thousands, render_error, ChartKind, ChartOutcome, SkipReason, SkippedChart,
    AXIS_DESC_POINTS, FONT_FAMILY, TICK_LABEL_POINTS, TITLE_PAD_POINTS, TITLE_POINTS,
};
use crate::config::{ChartStyle, ReportConfig};
use crate::parser::Dataset;
use crate::stats::mean;
use crate::ReportError;

const TITLE: &str = "Server Throughput";
const Y_DESC: &str = "Queries Per Second (QPS)";
const BAR_LABEL: &str = "Server Throughput";
const VALUE_SUFFIX: &str = "QPS";
const VALUE_LABEL_POINTS: f64 = 12.0;
const VALUE_LABEL_PAD_POINTS: f64 = 5.0;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

const BAR_HALF_WIDTH: f64 = 0.25;
/// Headroom above the bar for the value label.
const Y_HEADROOM: f64 = 1.15;
/// Largest mean whose headroom still fits in an `f64`.
const MAX_PLOTTABLE_QPS: f64 = f64::MAX / Y_HEADROOM;
/// Below this axis height whole-number tick labels would repeat.
const DECIMAL_TICKS_BELOW: f64 = 10.0;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

/// Operations per second for one `ns/op` measurement.
///
/// `None` when the latency is not positive, or so small that the rate overflows.
pub fn qps(latency_ns: f64) -> Option<f64> {
    if latency_ns <= 0.0 {
        return None;
    }
    let qps = NANOS_PER_SECOND / latency_ns;
    qps.is_finite().then_some(qps)
}

/// Plot data for the throughput bar of one benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputChart {
    pub benchmark: String,
    /// Records that contributed to the mean.
    pub samples: usize,
    pub mean_qps: f64,
}

impl ThroughputChart {
    pub fn from_dataset(dataset: &Dataset, benchmark: &str) -> Result<Self, SkipReason> {
        let latencies = dataset.latencies_for(benchmark);
        if latencies.is_empty() {
            return Err(SkipReason::NoRecords);
        }

        let rates: Vec<f64> = latencies.iter().filter_map(|&ns| qps(ns)).collect();
        if rates.len() < latencies.len() {
            debug!(
                benchmark,
                dropped = latencies.len() - rates.len(),
                "ignoring non-positive latencies"
            );
        }
        let mean_qps = mean(&rates).ok_or(SkipReason::NoPositiveLatency)?;
        if mean_qps > MAX_PLOTTABLE_QPS {
            return Err(SkipReason::RateTooLarge);
        }

        Ok(Self {
            benchmark: benchmark.to_string(),
            samples: rates.len(),
            mean_qps,
        })
    }

    /// Value annotation drawn above the bar, e.g. `500,000 QPS`.
    pub fn label(&self) -> String {
        format!("{} {VALUE_SUFFIX}", format_thousands(self.mean_qps))
    }

    /// Top of the y axis, leaving room for the value label.
    pub fn y_axis_top(&self) -> f64 {
        (self.mean_qps * Y_HEADROOM).min(f64::MAX)
    }

    /// Draw the bar chart to `path` as a PNG, replacing any existing file.
    pub fn render(&self, path: &Path, style: &ChartStyle) -> Result<(), ReportError> {
        self.draw(path, style).map_err(|err| render_error(path, err))
    }

    fn draw(&self, path: &Path, style: &ChartStyle) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, style.canvas_size()).into_drawing_area();
        root.fill(&WHITE)?;

        let x_formatter = |x: &f64| {
            if x.abs() < 1e-6 {
                BAR_LABEL.to_string()
            } else {
                String::new()
            }
        };
        let y_top = self.y_axis_top();
        let y_formatter = move |y: &f64| tick_label(*y, y_top);

        let mut chart = ChartBuilder::on(&root)
            .caption(TITLE, (FONT_FAMILY, style.px(TITLE_POINTS)))
            .margin(style.px(10.0))
            .margin_top(style.px(TITLE_PAD_POINTS))
            .x_label_area_size(style.px(30.0))
            .y_label_area_size(style.px(70.0))
            .build_cartesian_2d(-0.5..0.5, 0.0..y_top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(3)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .y_desc(Y_DESC)
            .label_style((FONT_FAMILY, style.px(TICK_LABEL_POINTS)))
            .axis_desc_style((FONT_FAMILY, style.px(AXIS_DESC_POINTS)))
            .draw()?;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(-BAR_HALF_WIDTH, 0.0), (BAR_HALF_WIDTH, self.mean_qps)],
            SKY_BLUE.filled(),
        )))?;

        let value_style = (FONT_FAMILY, style.font_px(VALUE_LABEL_POINTS))
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        let pad = style.px(VALUE_LABEL_PAD_POINTS) as i32;
        chart.draw_series(std::iter::once(
            EmptyElement::at((0.0, self.mean_qps)) + Text::new(self.label(), (0, -pad), value_style),
        ))?;

        root.present()?;
        Ok(())
    }
}

/// Y tick label on an axis running from 0 to `axis_top`.
fn tick_label(value: f64, axis_top: f64) -> String {
    if axis_top < DECIMAL_TICKS_BELOW {
        format!("{value:.2}")
    } else {
        format_thousands(value)
    }
}

/// Build and write the throughput bar chart, or skip it when the configured
/// benchmark has no usable samples.
pub fn render_throughput_chart(
    dataset: &Dataset,
    config: &ReportConfig,
) -> Result<ChartOutcome, ReportError> {
    let benchmark = &config.throughput_benchmark;
    let chart = match ThroughputChart::from_dataset(dataset, benchmark) {
        Ok(chart) => chart,
        Err(reason) => {
            let skipped = SkippedChart::new(ChartKind::Throughput, benchmark, reason);
            info!(%skipped);
            return Ok(ChartOutcome::Skipped(skipped));
        }
    };

    let path = &config.throughput_output;
    info!(path = %path.display(), mean_qps = chart.mean_qps, "saving throughput chart");
    chart.render(path, &config.style)?;
    Ok(ChartOutcome::Written(path.clone()))
}

#[cfg(test)]
mod throughput_tests {
    use super::*;
    use crate::parser::BenchmarkRecord;
    use crate::test_utils::TestDir;

    const NAME: &str = "BenchmarkServerThroughput";

    #[test]
    fn test_qps_conversion() {
        assert_eq!(qps(2000.0), Some(500_000.0));
        assert_eq!(qps(1.0), Some(1e9));
        assert_eq!(qps(0.0), None);
        assert_eq!(qps(-5.0), None);
        assert_eq!(qps(f64::MIN_POSITIVE), None);
    }

    #[test]
    fn test_mean_qps_of_three_known_latencies() {
        // 1e9 / 1000 = 1_000_000, 1e9 / 2000 = 500_000, 1e9 / 4000 = 250_000
        let dataset = Dataset::new(vec![
            BenchmarkRecord::new(NAME, 1000.0),
            BenchmarkRecord::new("BenchmarkServerE2E", 1.0),
            BenchmarkRecord::new(NAME, 2000.0),
            BenchmarkRecord::new(NAME, 4000.0),
        ]);
        let chart = ThroughputChart::from_dataset(&dataset, NAME).unwrap();
        assert_eq!(chart.samples, 3);
        assert!((chart.mean_qps - 1_750_000.0 / 3.0).abs() < 1e-6);
        assert_eq!(chart.label(), "583,333 QPS");
    }

    #[test]
    fn test_uniform_latency_label() {
        let dataset: Dataset = (0..3).map(|_| BenchmarkRecord::new(NAME, 2000.0)).collect();
        let chart = ThroughputChart::from_dataset(&dataset, NAME).unwrap();
        assert_eq!(chart.mean_qps, 500_000.0);
        assert_eq!(chart.label(), "500,000 QPS");
    }

    #[test]
    fn test_non_positive_latencies_are_excluded() {
        let dataset = Dataset::new(vec![
            BenchmarkRecord::new(NAME, 0.0),
            BenchmarkRecord::new(NAME, 2000.0),
        ]);
        let chart = ThroughputChart::from_dataset(&dataset, NAME).unwrap();
        assert_eq!(chart.samples, 1);
        assert_eq!(chart.mean_qps, 500_000.0);
    }

    #[test]
    fn test_all_zero_latencies_skip_the_chart() {
        let dataset = Dataset::new(vec![
            BenchmarkRecord::new(NAME, 0.0),
            BenchmarkRecord::new(NAME, 0.0),
        ]);
        assert_eq!(
            ThroughputChart::from_dataset(&dataset, NAME),
            Err(SkipReason::NoPositiveLatency)
        );
    }

    #[test]
    fn test_mean_of_huge_rates_stays_finite() {
        // each rate is 1e308, their sum is not representable
        let dataset = Dataset::new(vec![
            BenchmarkRecord::new(NAME, 1e-299),
            BenchmarkRecord::new(NAME, 1e-299),
        ]);
        let chart = ThroughputChart::from_dataset(&dataset, NAME).unwrap();
        assert_eq!(chart.samples, 2);
        assert_eq!(Some(chart.mean_qps), qps(1e-299));
        assert!(chart.y_axis_top().is_finite());
    }

    #[test]
    fn test_rate_without_axis_headroom_is_skipped() {
        // 1e9 / 6e-300 is finite, but not once the headroom is added
        let dataset = Dataset::new(vec![BenchmarkRecord::new(NAME, 6e-300)]);
        assert!(qps(6e-300).is_some());
        assert_eq!(
            ThroughputChart::from_dataset(&dataset, NAME),
            Err(SkipReason::RateTooLarge)
        );
    }

    #[test]
    fn test_tick_labels_keep_decimals_on_short_axes() {
        assert_eq!(tick_label(0.5, 2.3), "0.50");
        assert_eq!(tick_label(1.25, 2.3), "1.25");
        assert_eq!(tick_label(0.0, 2.3), "0.00");
        assert_eq!(tick_label(500_000.0, 575_000.0), "500,000");
        assert_eq!(tick_label(10.0, 11.5), "10");
    }

    #[test]
    fn test_y_axis_top_leaves_headroom() {
        let chart = ThroughputChart {
            benchmark: NAME.to_string(),
            samples: 1,
            mean_qps: 2.0,
        };
        assert!((chart.y_axis_top() - 2.3).abs() < 1e-12);
    }

    #[test]
    fn test_missing_benchmark_is_skipped_without_writing() {
        let dir = TestDir::new();
        let config = ReportConfig {
            throughput_output: dir.path().join("throughput.png"),
            ..ReportConfig::default()
        };
        let dataset = Dataset::new(vec![BenchmarkRecord::new("BenchmarkServerE2E", 250.5)]);

        let outcome = render_throughput_chart(&dataset, &config).unwrap();
        assert_eq!(
            outcome,
            ChartOutcome::Skipped(SkippedChart::new(
                ChartKind::Throughput,
                NAME,
                SkipReason::NoRecords
            ))
        );
        assert!(!config.throughput_output.exists());
    }
}
