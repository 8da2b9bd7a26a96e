//! Structured logging and tracing for Landmass.
//!
//! Console output with uptime timestamps and module paths, plus JSON file
//! logging in debug builds for post-mortem analysis of generation runs. The
//! level comes from `RUST_LOG` when set, otherwise from the config's
//! `debug.log_level`.

use landmass_config::Config;
use std::fs::File;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config supplies one.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "landmass.log";

/// Initialize the tracing subscriber.
///
/// * `log_dir` - Optional directory for JSON log files (debug builds only)
/// * `debug_build` - Whether this is a debug build (enables file logging)
/// * `config` - Optional configuration to use for log level override
///
/// ```no_run
/// use landmass_log::init_logging;
/// use landmass_config::Config;
///
/// let config = Config::default();
/// init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_string(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    // Workers are named, so thread names are worth printing.
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(log_file) = open_log_file(log_dir, debug_build) {
        subscriber.with(json_file_layer(log_file)).init();
        return;
    }

    subscriber.init();
}

/// Create `log_dir/landmass.log` for the JSON layer.
///
/// Returns `None` outside debug builds, without a directory, or when the
/// file cannot be created; logging then stays console-only.
pub fn open_log_file(log_dir: Option<&Path>, debug_build: bool) -> Option<File> {
    if !debug_build {
        return None;
    }
    let log_dir = log_dir?;
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}

/// One JSON object per event, without ANSI colours.
pub fn json_file_layer<S>(log_file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json()
}

/// The filter directive derived from the config, or [`DEFAULT_FILTER`].
pub fn filter_string(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
