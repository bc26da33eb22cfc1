//! Logging bootstrap for changelog runs.
//!
//! Runs report through `tracing`: one `info` event per generated changelog,
//! `debug` events per change set and `warn` events for unsupported changes.
//! Binaries embedding schemalog call [`init`] once to route those events to
//! stderr, controlled by the environment:
//!
//! - `SCHEMALOG_DEBUG=true|1|yes` enables debug events
//! - `SCHEMALOG_LOG_LEVEL=trace|debug|info|warn|error` picks the level
//! - `SCHEMALOG_LOG_FORMAT=json|pretty|compact` picks the format (default: json)
//!
//! ```rust,no_run
//! schemalog_changelog::logging::init();
//! ```
//!
//! Without the `tracing-subscriber` feature no subscriber is installed and
//! events only reach a subscriber the application sets up itself.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human output.
    Pretty,
    /// Single-line human output.
    Compact,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to JSON.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }
}

/// Check if debug logging is enabled via `SCHEMALOG_DEBUG`.
pub fn is_debug_enabled() -> bool {
    env::var("SCHEMALOG_DEBUG")
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

/// The level selected by `SCHEMALOG_LOG_LEVEL` and `SCHEMALOG_DEBUG`.
pub fn get_log_level() -> &'static str {
    resolve_level(env::var("SCHEMALOG_LOG_LEVEL").ok().as_deref(), is_debug_enabled())
}

/// The format selected by `SCHEMALOG_LOG_FORMAT`.
pub fn get_log_format() -> LogFormat {
    env::var("SCHEMALOG_LOG_FORMAT")
        .map(|f| LogFormat::parse(&f))
        .unwrap_or_default()
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Pick the level from an explicit setting, falling back to `debug` when
/// debug is on and `warn` otherwise.
fn resolve_level(level: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match level.map(str::to_ascii_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// Install the schemalog subscriber.
///
/// Subsequent calls are no-ops. Nothing is installed unless
/// `SCHEMALOG_DEBUG` or `SCHEMALOG_LOG_LEVEL` is set, or when another
/// global subscriber is already in place.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("SCHEMALOG_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "schemalog={level},schemalog_schema={level},schemalog_changelog={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let format = get_log_format();
            let installed = match format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::debug!(level, ?format, "Changelog logging initialized");
            }
        }
    });
}
