use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Map the number of `-v` flags to a log level. Warnings are always shown.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initializes the `tracing` logger.
///
/// Log output goes to stderr so stdout only carries the report itself.
pub fn init_logger(verbosity: u8) {
    let level = level_for_verbosity(verbosity);

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    debug!("Log level: {level}");
}
