//! File logging. The terminal belongs to the TUI, so nothing is written to
//! stdout or stderr once logging is up.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

const LOG_FILE: &str = "tunebox.log";

/// Install a daily-rotated file subscriber under `<data_dir>/logs`.
///
/// `RUST_LOG` overrides `settings.level`. Keep the returned guard alive for
/// as long as log lines should reach the file.
pub fn init(data_dir: &Path, settings: &LoggingSettings) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}
