use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::LazyLock,
};

use regex::Regex;
use tracing::{debug, info};

use crate::ReportError;

/// Matches one line of `go test -bench` output, e.g.
/// `BenchmarkServerE2E-8   1000   250.5 ns/op   48 B/op`.
///
/// Group 1 is the benchmark name without the `-N` parallelism suffix and
/// group 3 is the latency in nanoseconds per operation.
const BENCH_LINE_PATTERN: &str = r"^(Benchmark\w+)(-\d+)?\s+\d+\s+([\d.]*)\s+ns/op";

static BENCH_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BENCH_LINE_PATTERN).expect("benchmark line pattern compiles"));

/// A single (name, latency) observation taken from the results log.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    pub name: String,
    pub latency_ns: f64,
}

impl BenchmarkRecord {
    pub fn new(name: impl Into<String>, latency_ns: f64) -> Self {
        Self {
            name: name.into(),
            latency_ns,
        }
    }
}

/// Every record produced by one parse pass, in input line order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<BenchmarkRecord>,
}

impl Dataset {
    pub fn new(records: Vec<BenchmarkRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    /// Latencies of every record named exactly `name`, in input order.
    pub fn latencies_for(&self, name: &str) -> Vec<f64> {
        self.records
            .iter()
            .filter(|record| record.name == name)
            .map(|record| record.latency_ns)
            .collect()
    }
}

impl FromIterator<BenchmarkRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = BenchmarkRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Extract a record from one line of benchmark output.
///
/// Returns `None` for lines that do not match, and for matching lines whose
/// latency column is not a finite decimal number.
pub fn parse_line(line: &str) -> Option<BenchmarkRecord> {
    let captures = BENCH_LINE.captures(line)?;
    let name = &captures[1];
    let raw_latency = &captures[3];

    match raw_latency.parse::<f64>() {
        Ok(latency_ns) if latency_ns.is_finite() => Some(BenchmarkRecord::new(name, latency_ns)),
        _ => {
            debug!(benchmark = name, raw_latency, "skipping line with unparsable latency");
            None
        }
    }
}

/// Parse every line of `reader`. Lines that do not match are ignored.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Dataset, std::io::Error> {
    let mut records = Vec::new();
    for line in reader.lines() {
        if let Some(record) = parse_line(&line?) {
            records.push(record);
        }
    }
    Ok(Dataset::new(records))
}

/// Open the results file at `path` and parse it into a [`Dataset`].
pub fn parse_benchmark_results<P: AsRef<Path>>(path: P) -> Result<Dataset, ReportError> {
    let path = path.as_ref();
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let dataset = parse_reader(BufReader::new(file)).map_err(io_error)?;
    info!(path = %path.display(), records = dataset.len(), "parsed benchmark results");
    Ok(dataset)
}
