//! Process-wide pipeline configuration
//!
//! Settings are fixed when a [`LoggerRegistry`](crate::LoggerRegistry) is
//! created. They can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "log_directory": "/var/log/myapp",
//!   "max_log_age_ms": 5000,
//!   "max_queue_size": 100
//! }
//! ```

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_DIRECTORY: &str = "./";
pub const DEFAULT_MAX_LOG_AGE_MS: u64 = 5 * 1000;
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;
pub const DEFAULT_TICK_MS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Root directory for every file sink
    pub log_directory: PathBuf,
    /// Interval between forced flushes, in milliseconds
    pub max_log_age_ms: u64,
    /// Buffered entry count at which a soft flush writes a file sink out
    pub max_queue_size: usize,
    /// Scheduler idle tick, in milliseconds
    pub tick_ms: u64,
    /// Gzip the previous period's file when a file sink rotates
    pub compress_rotated: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            max_log_age_ms: DEFAULT_MAX_LOG_AGE_MS,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            tick_ms: DEFAULT_TICK_MS,
            compress_rotated: false,
        }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn builder() -> LoggingConfigBuilder {
        LoggingConfigBuilder::new()
    }

    pub fn max_log_age(&self) -> Duration {
        Duration::from_millis(self.max_log_age_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Check the settings for values the scheduler cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.max_log_age_ms == 0 {
            return Err(LoggerError::config("max_log_age_ms", "must be greater than zero"));
        }
        if self.max_queue_size == 0 {
            return Err(LoggerError::config("max_queue_size", "must be greater than zero"));
        }
        if self.tick_ms == 0 {
            return Err(LoggerError::config("tick_ms", "must be greater than zero"));
        }
        if self.tick_ms > self.max_log_age_ms {
            return Err(LoggerError::config(
                "tick_ms",
                format!(
                    "tick of {}ms exceeds max_log_age_ms of {}ms",
                    self.tick_ms, self.max_log_age_ms
                ),
            ));
        }
        if self.log_directory.as_os_str().is_empty() {
            return Err(LoggerError::config("log_directory", "must not be empty"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logging configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }
}

/// Builder for [`LoggingConfig`]
///
/// # Example
///
/// ```
/// use rust_logger_pipeline::LoggingConfig;
/// use std::time::Duration;
///
/// let config = LoggingConfig::builder()
///     .log_directory("logs")
///     .max_log_age(Duration::from_secs(2))
///     .max_queue_size(500)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_log_age_ms, 2000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoggingConfigBuilder {
    config: LoggingConfig,
}

impl LoggingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_directory = dir.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_log_age(mut self, age: Duration) -> Self {
        self.config.max_log_age_ms = u64::try_from(age.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.config.max_queue_size = size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn tick(mut self, tick: Duration) -> Self {
        self.config.tick_ms = u64::try_from(tick.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress_rotated(mut self, enabled: bool) -> Self {
        self.config.compress_rotated = enabled;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<LoggingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
