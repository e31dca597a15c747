//! Logging and tracing setup for the `sqldocs` binary
//!
//! Console output goes to stderr so it never interleaves with the progress
//! lines on stdout. When a log directory is given, a JSON layer additionally
//! writes daily rolling files there. `RUST_LOG` takes precedence over the
//! built-in filters.

use std::path::PathBuf;
use std::time::Instant;

use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const QUIET_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "info,sqldocs_cli=debug,sqldocs_core=debug,sqldocs_drivers=debug,sqldocs_driver_postgres=debug,sqldocs_driver_sqlite=debug,sqldocs_docs=debug";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for JSON log files; no files are written when unset
    pub log_dir: Option<PathBuf>,

    /// Whether to log to the console
    pub enable_console_logs: bool,

    /// Whether to include file/line information in console logs
    pub include_location: bool,

    /// Whether to log span open/close events
    pub enable_spans: bool,

    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            enable_console_logs: true,
            include_location: false,
            enable_spans: false,
            default_filter: QUIET_FILTER.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Debug output for the SqlDocs crates, with span timings
    pub fn verbose() -> Self {
        Self {
            include_location: cfg!(debug_assertions),
            enable_spans: true,
            default_filter: VERBOSE_FILTER.to_string(),
            ..Self::default()
        }
    }

    /// Configuration for the command line flags
    pub fn from_flags(verbose: bool, log_dir: Option<PathBuf>) -> Self {
        let config = if verbose {
            Self::verbose()
        } else {
            Self::default()
        };
        Self { log_dir, ..config }
    }
}

/// Install the global subscriber
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    // NEW rather than ENTER: awaited futures re-enter their span on every poll
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();

    if config.enable_console_logs {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.enable_spans)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .compact()
            .with_filter(env_filter.clone())
            .boxed();

        layers.push(console_layer);
    }

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "sqldocs.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The writer flushes on drop of the guard; it must outlive the process
        std::mem::forget(guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();

        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        log_dir = ?config.log_dir,
        console_enabled = config.enable_console_logs,
        "logging initialized"
    );

    Ok(())
}

/// Logs the duration of an operation when dropped
pub struct TimingGuard {
    name: &'static str,
    start: Instant,
}

impl TimingGuard {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        tracing::debug!(
            operation = self.name,
            duration_ms = self.start.elapsed().as_millis() as u64,
            "operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_quiet() {
        let config = LoggingConfig::default();
        assert!(config.enable_console_logs);
        assert!(config.log_dir.is_none());
        assert_eq!(config.default_filter, "warn");
    }

    #[test]
    fn test_verbose_flags() {
        let config = LoggingConfig::from_flags(true, Some(PathBuf::from("logs")));
        assert!(config.enable_spans);
        assert!(config.default_filter.contains("sqldocs_core=debug"));
        assert_eq!(config.log_dir, Some(PathBuf::from("logs")));
    }

    #[test]
    fn test_quiet_flags() {
        let config = LoggingConfig::from_flags(false, None);
        assert!(!config.enable_spans);
        assert_eq!(config.default_filter, QUIET_FILTER);
    }
}
