//! Logging setup for tagrule.
//!
//! The engine emits `tracing` events (rule dispatch at `trace`, per-call
//! summaries at `debug`, fail-fast aborts at `warn`). Applications that do not
//! install their own subscriber can use [`LogConfig`] to get one.
//!
//! # Examples
//!
//! ```no_run
//! use tagrule_core::logging::*;
//!
//! // JSON logging at INFO, honouring `TAGRULE_LOG` when set
//! LogConfig::from_env().init().ok();
//!
//! // Explicit configuration
//! LogConfig::new()
//!     .level(LogLevel::Debug)
//!     .format(LogFormat::Pretty)
//!     .with_env_filter("tagrule_validation=trace")
//!     .init()
//!     .ok();
//! ```

use std::env;
use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

// Re-export tracing for convenience
pub use tracing::{debug, error, info, trace, warn};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_FILTER_ENV: &str = "TAGRULE_LOG";

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "TAGRULE_LOG_FORMAT";

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to string for EnvFilter
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format (default) - structured, machine-readable
    Json,
    /// Pretty format - multi-line, for development
    Pretty,
    /// Compact format - single line
    Compact,
}

impl LogFormat {
    /// Parse a format name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Include target (module path)
    pub targets: bool,
    /// Custom environment filter (overrides level if set)
    pub env_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            targets: true,
            env_filter: None,
        }
    }
}

impl LogConfig {
    /// Create a new logging configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `TAGRULE_LOG` and `TAGRULE_LOG_FORMAT`.
    ///
    /// Unset or unparsable variables keep the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(filter) = env::var(LOG_FILTER_ENV) {
            if !filter.trim().is_empty() {
                config.env_filter = Some(filter);
            }
        }

        if let Some(format) = env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| LogFormat::parse(&s))
        {
            config.format = format;
        }

        config
    }

    /// Set log level
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set output format
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable target (module path)
    pub fn with_targets(mut self, enable: bool) -> Self {
        self.targets = enable;
        self
    }

    /// Set custom environment filter, e.g. `"tagrule_validation=trace"`
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Build the filter this configuration would install.
    pub fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(directive) => {
                EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.as_str())),
        }
    }

    /// Install a global subscriber writing to stderr.
    ///
    /// Fails if a global subscriber is already set.
    pub fn init(self) -> Result<(), TryInitError> {
        let filter = self.filter();

        match self.format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(self.targets),
                )
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr)
                        .with_target(self.targets),
                )
                .try_init(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_target(self.targets),
                )
                .try_init(),
        }
    }
}
