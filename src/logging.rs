//! Console and file logging.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use shelfscan_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the file writer flushing until the process exits.
static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Log file name for a run started at `started`.
pub(crate) fn log_file_name(started: DateTime<Local>) -> String {
    format!("extraction_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// Install the console layer and a per-run file layer.
///
/// `RUST_LOG` overrides the console level. Returns the log file path.
pub(crate) fn init_tracing(config: &LoggingConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_dir = Path::new(&config.dir);
    std::fs::create_dir_all(log_dir)?;

    let file_name = log_file_name(Local::now());
    let file_appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = GUARD.set(guard);

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.console_level));
    let file_filter = EnvFilter::new(&config.file_level);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(true)
                .with_filter(console_filter),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .try_init()?;

    Ok(log_dir.join(file_name))
}
