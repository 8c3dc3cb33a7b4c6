use std::{error::Error, path::Path};

use plotters::prelude::*;
use tracing::info;

use super::{
    padded_range, render_error, ChartKind, ChartOutcome, SkipReason, SkippedChart, AXIS_DESC_POINTS,
    FONT_FAMILY, TICK_LABEL_POINTS, TITLE_POINTS, TITLE_PAD_POINTS,
};
use crate::config::{ChartStyle, ReportConfig};
use crate::parser::Dataset;
use crate::stats::BoxStats;
use crate::ReportError;

const TITLE: &str = "End-to-End DNS Query Latency";
const Y_DESC: &str = "Latency (nanoseconds per op)";

/// The single box sits at x = 1 on a 0..2 axis.
const BOX_X: f64 = 1.0;
const BOX_HALF_WIDTH: f64 = 0.25;
const CAP_HALF_WIDTH: f64 = 0.125;

const BOX_COLOR: RGBColor = RGBColor(31, 119, 180);
const MEDIAN_COLOR: RGBColor = RGBColor(44, 160, 44);

/// Plot data for the latency box plot of one benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyChart {
    pub benchmark: String,
    pub stats: BoxStats,
}

impl LatencyChart {
    pub fn from_dataset(dataset: &Dataset, benchmark: &str) -> Result<Self, SkipReason> {
        let latencies = dataset.latencies_for(benchmark);
        let stats = BoxStats::from_samples(&latencies).ok_or(SkipReason::NoRecords)?;
        Ok(Self {
            benchmark: benchmark.to_string(),
            stats,
        })
    }

    /// Draw the box plot to `path` as a PNG, replacing any existing file.
    pub fn render(&self, path: &Path, style: &ChartStyle) -> Result<(), ReportError> {
        self.draw(path, style).map_err(|err| render_error(path, err))
    }

    fn draw(&self, path: &Path, style: &ChartStyle) -> Result<(), Box<dyn Error>> {
        let stats = &self.stats;
        let root = BitMapBackend::new(path, style.canvas_size()).into_drawing_area();
        root.fill(&WHITE)?;

        let (y_low, y_high) = padded_range(stats.min, stats.max);
        let benchmark = self.benchmark.clone();
        let x_formatter = move |x: &f64| {
            if (x - BOX_X).abs() < 1e-6 {
                benchmark.clone()
            } else {
                String::new()
            }
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(TITLE, (FONT_FAMILY, style.px(TITLE_POINTS)))
            .margin(style.px(10.0))
            .margin_top(style.px(TITLE_PAD_POINTS))
            .x_label_area_size(style.px(30.0))
            .y_label_area_size(style.px(60.0))
            .build_cartesian_2d(0.0..2.0, y_low..y_high)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(3)
            .x_label_formatter(&x_formatter)
            .y_desc(Y_DESC)
            .label_style((FONT_FAMILY, style.px(TICK_LABEL_POINTS)))
            .axis_desc_style((FONT_FAMILY, style.px(AXIS_DESC_POINTS)))
            .draw()?;

        let line_width = style.px(1.0);
        let box_left = BOX_X - BOX_HALF_WIDTH;
        let box_right = BOX_X + BOX_HALF_WIDTH;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(box_left, stats.q1), (box_right, stats.q3)],
            BOX_COLOR.mix(0.25).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(box_left, stats.q1), (box_right, stats.q3)],
            BOX_COLOR.stroke_width(line_width),
        )))?;

        let whiskers = [
            vec![(BOX_X, stats.q1), (BOX_X, stats.whisker_low)],
            vec![(BOX_X, stats.q3), (BOX_X, stats.whisker_high)],
            vec![
                (BOX_X - CAP_HALF_WIDTH, stats.whisker_low),
                (BOX_X + CAP_HALF_WIDTH, stats.whisker_low),
            ],
            vec![
                (BOX_X - CAP_HALF_WIDTH, stats.whisker_high),
                (BOX_X + CAP_HALF_WIDTH, stats.whisker_high),
            ],
        ];
        chart.draw_series(
            whiskers
                .into_iter()
                .map(|points| PathElement::new(points, BLACK.stroke_width(line_width))),
        )?;

        chart.draw_series(std::iter::once(PathElement::new(
            vec![(box_left, stats.median), (box_right, stats.median)],
            MEDIAN_COLOR.stroke_width(line_width * 2),
        )))?;

        chart.draw_series(
            stats
                .outliers
                .iter()
                .map(|&v| Circle::new((BOX_X, v), style.px(3.0), BLACK.stroke_width(line_width))),
        )?;

        root.present()?;
        Ok(())
    }
}

/// Build and write the latency box plot, or skip it when the configured
/// benchmark has no samples.
pub fn render_latency_chart(
    dataset: &Dataset,
    config: &ReportConfig,
) -> Result<ChartOutcome, ReportError> {
    let benchmark = &config.latency_benchmark;
    let chart = match LatencyChart::from_dataset(dataset, benchmark) {
        Ok(chart) => chart,
        Err(reason) => {
            let skipped = SkippedChart::new(ChartKind::Latency, benchmark, reason);
            info!(%skipped);
            return Ok(ChartOutcome::Skipped(skipped));
        }
    };

    let path = &config.latency_output;
    info!(path = %path.display(), %benchmark, "saving latency chart");
    chart.render(path, &config.style)?;
    Ok(ChartOutcome::Written(path.clone()))
}

#[cfg(test)]
mod latency_tests {
    use super::*;
    use crate::parser::BenchmarkRecord;
    use crate::test_utils::TestDir;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            BenchmarkRecord::new("BenchmarkServerE2E", 250.5),
            BenchmarkRecord::new("BenchmarkServerThroughput", 2000.0),
            BenchmarkRecord::new("BenchmarkServerE2E", 260.0),
            BenchmarkRecord::new("BenchmarkServerE2E", 240.0),
            BenchmarkRecord::new("BenchmarkServerE2E", 255.0),
            BenchmarkRecord::new("BenchmarkServerE2E", 245.0),
        ])
    }

    #[test]
    fn test_latency_chart_uses_only_named_records() {
        let chart = LatencyChart::from_dataset(&dataset(), "BenchmarkServerE2E").unwrap();
        assert_eq!(chart.benchmark, "BenchmarkServerE2E");
        assert_eq!(chart.stats.min, 240.0);
        assert_eq!(chart.stats.median, 250.5);
        assert_eq!(chart.stats.max, 260.0);
    }

    #[test]
    fn test_latency_chart_data_is_idempotent() {
        let dataset = dataset();
        let first = LatencyChart::from_dataset(&dataset, "BenchmarkServerE2E").unwrap();
        let second = LatencyChart::from_dataset(&dataset, "BenchmarkServerE2E").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_benchmark_is_skipped_without_writing() {
        let dir = TestDir::new();
        let config = ReportConfig {
            latency_output: dir.path().join("latency.png"),
            latency_benchmark: "BenchmarkNotInLog".to_string(),
            ..ReportConfig::default()
        };

        let outcome = render_latency_chart(&dataset(), &config).unwrap();
        match outcome {
            ChartOutcome::Skipped(skipped) => {
                assert_eq!(skipped.kind, ChartKind::Latency);
                assert_eq!(skipped.reason, SkipReason::NoRecords);
                assert_eq!(
                    skipped.to_string(),
                    "No data found for 'BenchmarkNotInLog'. Skipping latency chart."
                );
            }
            other => panic!("expected skip, got {other:?}"),
        }
        assert!(!config.latency_output.exists());
    }

    #[test]
    fn test_zero_latency_samples_are_still_plotted() {
        let dataset = Dataset::new(vec![
            BenchmarkRecord::new("BenchmarkServerE2E", 0.0),
            BenchmarkRecord::new("BenchmarkServerE2E", 10.0),
        ]);
        let chart = LatencyChart::from_dataset(&dataset, "BenchmarkServerE2E").unwrap();
        assert_eq!(chart.stats.min, 0.0);
        assert_eq!(chart.stats.median, 5.0);
    }
}
