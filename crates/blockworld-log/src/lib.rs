//! Structured logging for the block world.
//!
//! Console output with uptime timestamps, module paths, and thread names,
//! plus an optional JSON log file for post-mortem analysis. `RUST_LOG`
//! takes precedence over the configured level.

use std::fs::File;
use std::path::Path;

use blockworld_config::Config;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the JSON log file inside the log directory.
pub const LOG_FILE_NAME: &str = "blockworld.log";

const DEFAULT_FILTER: &str = "info";

/// Installs the global tracing subscriber.
///
/// The JSON file layer is added when `config.debug.log_to_file` is set and
/// `log_dir` is given; failing to create the file only disables that layer.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use blockworld_config::Config;
/// use blockworld_log::init_logging;
///
/// let config = Config::default();
/// init_logging(None, Some(&config)).unwrap();
/// ```
pub fn init_logging(log_dir: Option<&Path>, config: Option<&Config>) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true) // persistence workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let log_to_file = config.is_some_and(|config| config.debug.log_to_file);
    if log_to_file
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = File::create(log_dir.join(LOG_FILE_NAME))
    {
        subscriber.with(json_file_layer(log_file)).try_init()?;
        tracing::debug!("Logging to {}", log_dir.join(LOG_FILE_NAME).display());
        return Ok(());
    }

    subscriber.try_init()
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// JSON lines without ANSI codes, one event per line.
pub fn json_file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json()
}
