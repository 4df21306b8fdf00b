//! Logging configuration using tracing
//!
//! Stdout is reserved for reports, so log output goes to a rolling file and,
//! in verbose mode, to stderr as well.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable that overrides the log filter
pub const LOG_ENV_VAR: &str = "PLUGIN_DETECTIVE_LOG";

const DEFAULT_FILTER: &str =
    "plugin_detective=info,flutter_plugin_detective=info,detective_app=info,detective_scan=info,detective_core=info,warn";
const VERBOSE_FILTER: &str =
    "plugin_detective=debug,flutter_plugin_detective=debug,detective_app=debug,detective_scan=debug,detective_core=debug,info";

/// Initialize the logging subsystem
///
/// Logs are written to `<data_local_dir>/plugin-detective/logs/`.
/// Log level is controlled by the `PLUGIN_DETECTIVE_LOG` environment variable.
///
/// # Examples
/// ```bash
/// PLUGIN_DETECTIVE_LOG=debug plugin-detective scan
/// ```
pub fn init(verbose: bool) -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "detective.log");

    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_timer(fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ));

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Flutter Plugin Detective starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("plugin-detective").join("logs"))
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join("detective.log"))
}
