//! Core logger types and traits

pub mod clock;
pub mod config;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod registry;
pub mod ring_buffer;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LoggingConfig, LoggingConfigBuilder};
pub use error::{LoggerError, Result};
pub use log_entry::{CallerLocation, LogEntry};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::SinkMetrics;
pub use registry::{LoggerRegistry, SCHEDULER_THREAD_NAME};
pub use ring_buffer::RingBuffer;
pub use sink::{AnySink, Sink, SinkSet};
