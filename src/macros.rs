//! Logging macros for ergonomic log message formatting.
//!
//! These macros format like `format!` and record the calling module as the
//! member, alongside the file and line.
//!
//! # Examples
//!
//! ```
//! use rust_logger_pipeline::prelude::*;
//! use rust_logger_pipeline::info;
//!
//! let logger = Logger::builder("app::Server")
//!     .sink(ConsoleSink::with_writer("Server", std::io::sink()))
//!     .build();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_logger_pipeline::prelude::*;
/// # let logger = Logger::builder("Foo").build();
/// use rust_logger_pipeline::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at(
            $level,
            format!($($arg)+),
            $crate::CallerLocation::new(module_path!(), file!(), line!()),
        )
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_pipeline::prelude::*;
/// # let logger = Logger::builder("Foo").build();
/// use rust_logger_pipeline::info;
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_pipeline::prelude::*;
/// # let logger = Logger::builder("Foo").build();
/// use rust_logger_pipeline::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
