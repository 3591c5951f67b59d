//! Logging setup using `tracing` and `tracing-subscriber`
//!
//! # Log Levels
//!
//! - `error`: faults that stop a run
//! - `warn`: operator pauses waiting at the console
//! - `info`: step progress, prompts, run totals
//! - `debug`: per-step ledger state and configuration details
//!
//! `RUST_LOG` overrides the command-line level unless `-v`/`-q` was given.

use std::io::{self, IsTerminal};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field output
    #[default]
    Pretty,
    /// Single-line output
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` take precedence over `level_filter`
    pub use_env_filter: bool,
    pub format: LogFormat,
    pub with_timestamps: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            format: LogFormat::default(),
            with_timestamps: false,
            with_ansi: io::stderr().is_terminal(),
        }
    }
}

/// Install the global subscriber, writing to stderr
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = build_env_filter(config);
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false);

    match (config.format, config.with_timestamps) {
        (LogFormat::Pretty, true) => tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init(),
        (LogFormat::Pretty, false) => tracing_subscriber::registry()
            .with(filter)
            .with(layer.without_time())
            .try_init(),
        (LogFormat::Compact, true) => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init(),
        (LogFormat::Compact, false) => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact().without_time())
            .try_init(),
    }
}

fn default_directives(level: LevelFilter) -> String {
    // Other crates stay at warn
    format!(
        "warn,magwash={level},magwash_core={level},magwash_drivers={level}",
        level = level
    )
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let fallback = || EnvFilter::new(default_directives(config.level_filter));
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}
