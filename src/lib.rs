//! # Rust Logger Pipeline
//!
//! Per-identity loggers that fan every entry out to a console sink and a
//! daily file sink, with one background thread doing all file I/O.
//!
//! ## Features
//!
//! - **Cheap log calls**: file sinks only buffer in memory on the caller's thread
//! - **Batched writes**: a scheduler flushes early on backlog and always after `max_log_age`
//! - **Daily files**: one `<name>_<yyyy-MM-dd>.log` per logger and day, optionally gzipped on rotation
//! - **Clean shutdown**: every buffered line is written before the pipeline stops
//!
//! ## Example
//!
//! ```no_run
//! use rust_logger_pipeline::prelude::*;
//!
//! let config = LoggingConfig::builder().log_directory("logs").build()?;
//! rust_logger_pipeline::init(config)?;
//!
//! let logger = rust_logger_pipeline::get_logger("app::Server", SinkSet::ALL, Some("Server"))?;
//! logger.info("Server started");
//!
//! rust_logger_pipeline::shutdown()?;
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

use once_cell::sync::OnceCell;
use std::sync::Arc;

pub mod prelude {
    pub use crate::core::{
        CallerLocation, Clock, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError,
        LoggerRegistry, LoggingConfig, ManualClock, Result, Sink, SinkMetrics, SinkSet,
        SystemClock,
    };
    pub use crate::sinks::{ConsoleSink, FileSink};
}

pub use crate::core::{
    AnySink, CallerLocation, Clock, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError,
    LoggerRegistry, LoggingConfig, LoggingConfigBuilder, ManualClock, Result, RingBuffer, Sink,
    SinkMetrics, SinkSet, SystemClock, SCHEDULER_THREAD_NAME,
};
pub use crate::sinks::{ConsoleSink, FileSink};

static GLOBAL: OnceCell<LoggerRegistry> = OnceCell::new();

/// Install the process-wide registry and start its scheduler
///
/// # Errors
///
/// [`LoggerError::InvalidConfiguration`] for a bad config or when a global
/// registry already exists.
pub fn init(config: LoggingConfig) -> Result<&'static LoggerRegistry> {
    let registry = LoggerRegistry::new(config)?;
    if GLOBAL.set(registry).is_err() {
        return Err(LoggerError::config(
            "global registry",
            "already initialized",
        ));
    }
    let registry = global()
        .ok_or_else(|| LoggerError::other("Global logger registry missing after init"))?;
    registry.start()?;
    Ok(registry)
}

/// The process-wide registry, if one has been installed
pub fn global() -> Option<&'static LoggerRegistry> {
    GLOBAL.get()
}

/// Logger from the process-wide registry
///
/// Installs and starts a registry with the default configuration on first
/// use when [`init`] was never called.
pub fn get_logger(
    identity: &str,
    sinks: SinkSet,
    display_name: Option<&str>,
) -> Result<Arc<Logger>> {
    let registry = GLOBAL.get_or_try_init(|| {
        let registry = LoggerRegistry::new(LoggingConfig::default())?;
        registry.start()?;
        Ok::<_, LoggerError>(registry)
    })?;
    registry.get_logger(identity, sinks, display_name)
}

/// Drain and stop the process-wide registry
///
/// Statics are never dropped, so call this before the process exits to get
/// buffered lines onto disk. Does nothing when no registry was installed.
pub fn shutdown() -> Result<()> {
    match GLOBAL.get() {
        Some(registry) => registry.shutdown(),
        None => Ok(()),
    }
}
