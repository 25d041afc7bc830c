//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! # Log Levels
//!
//! - `error`: Undecodable input, I/O failures
//! - `warn`: Invalid documents, cancelled validation
//! - `info`: Command progress, defect counts
//! - `debug`: Per-series details
//! - `trace`: Subject-level values (requires explicit `--log-data`)
//!
//! # Usage
//!
//! ```ignore
//! use aecg_cli::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::default()).expect("init logging");
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when subject-level logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Crates whose events follow the configured level; everything else stays at `warn`.
const OWN_TARGETS: &[&str] = &["aecg_cli", "aecg_model", "aecg_validate", "aecg_xml"];

/// Returns true if subject-level logging is explicitly enabled.
pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns the input value when subject logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` take over when no level was given on the command line.
    pub use_env_filter: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// When set, logs are appended to the file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// Whether subject identifiers and names may be logged.
    pub log_data: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable events.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// Timestamped JSON objects with span close events.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

/// Initialize the global tracing subscriber with the given configuration.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            // Plain text in files regardless of the color choice.
            fmt_layer(config.format, false, Mutex::new(file))
        }
        None => fmt_layer(config.format, config.with_ansi, io::stderr),
    };
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    tracing_subscriber::registry()
        .with(layer)
        .with(build_env_filter(config))
        .init();
    Ok(())
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(format: LogFormat, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_target(false);
    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).without_time().boxed(),
        LogFormat::Compact => layer.compact().with_ansi(ansi).without_time().boxed(),
        LogFormat::Json => layer
            .json()
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .boxed(),
    }
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let fallback = || EnvFilter::new(default_directives(config.level_filter));
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}

fn default_directives(level: LevelFilter) -> String {
    let mut directives = vec![LevelFilter::WARN.min(level).to_string()];
    directives.extend(OWN_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_crates_follow_the_requested_level() {
        assert_eq!(
            default_directives(LevelFilter::DEBUG),
            "warn,aecg_cli=debug,aecg_model=debug,aecg_validate=debug,aecg_xml=debug"
        );
    }

    #[test]
    fn quiet_levels_lower_the_global_default() {
        assert!(default_directives(LevelFilter::ERROR).starts_with("error,"));
    }

    #[test]
    fn values_are_redacted_unless_enabled() {
        assert_eq!(redact_value("subject-17"), REDACTED_VALUE);
    }
}
