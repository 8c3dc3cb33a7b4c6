use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "bench_results.txt";
pub const DEFAULT_LATENCY_OUTPUT: &str = "benchmark_latency.png";
pub const DEFAULT_THROUGHPUT_OUTPUT: &str = "benchmark_throughput.png";
pub const DEFAULT_LATENCY_BENCHMARK: &str = "BenchmarkServerE2E";
pub const DEFAULT_THROUGHPUT_BENCHMARK: &str = "BenchmarkServerThroughput";
pub const DEFAULT_DPI: u32 = 150;

/// Physical canvas size and resolution shared by both charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
}

impl ChartStyle {
    const POINTS_PER_INCH: f64 = 72.0;

    /// Canvas size in pixels.
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Convert a font size in points to pixels at this resolution.
    pub fn font_px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / Self::POINTS_PER_INCH
    }

    /// Convert a length in points to whole pixels.
    pub fn px(&self, points: f64) -> u32 {
        self.font_px(points).round() as u32
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            width_in: 8.0,
            height_in: 6.0,
        }
    }
}

/// Everything one report run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub latency_output: PathBuf,
    pub throughput_output: PathBuf,
    pub latency_benchmark: String,
    pub throughput_benchmark: String,
    pub style: ChartStyle,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            latency_output: PathBuf::from(DEFAULT_LATENCY_OUTPUT),
            throughput_output: PathBuf::from(DEFAULT_THROUGHPUT_OUTPUT),
            latency_benchmark: DEFAULT_LATENCY_BENCHMARK.to_string(),
            throughput_benchmark: DEFAULT_THROUGHPUT_BENCHMARK.to_string(),
            style: ChartStyle::default(),
        }
    }
}
