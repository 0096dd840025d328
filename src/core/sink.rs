//! Sink contract for log output destinations

use super::{error::Result, log_level::LogLevel, metrics::SinkMetrics};
use crate::sinks::{ConsoleSink, FileSink};
use chrono::{DateTime, Local};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Operations every sink supports
///
/// All methods take `&self`: sinks are shared between caller threads, which
/// enqueue, and the scheduler thread, which flushes and rotates, so each
/// sink serializes access with its own locks.
pub trait Sink: Send + Sync {
    /// Accept one already formatted line
    fn enqueue(&self, level: LogLevel, line: &str);

    /// Write buffered output. A soft flush (`force == false`) may decide
    /// there is not enough pending to be worth it.
    fn flush(&self, force: bool) -> Result<()>;

    /// Start the logging period containing `timestamp`
    fn prepare_for_period(&self, timestamp: DateTime<Local>) -> Result<()>;

    /// Flush and release resources. Only the first call has an effect.
    fn dispose(&self) -> Result<()>;

    fn name(&self) -> &str;

    fn metrics(&self) -> &SinkMetrics;
}

/// The closed set of sinks a [`Logger`](crate::Logger) can hold
pub enum AnySink {
    Console(ConsoleSink),
    File(FileSink),
}

impl AnySink {
    pub fn as_file(&self) -> Option<&FileSink> {
        match self {
            AnySink::File(sink) => Some(sink),
            AnySink::Console(_) => None,
        }
    }

    pub fn as_console(&self) -> Option<&ConsoleSink> {
        match self {
            AnySink::Console(sink) => Some(sink),
            AnySink::File(_) => None,
        }
    }

    fn inner(&self) -> &dyn Sink {
        match self {
            AnySink::Console(sink) => sink,
            AnySink::File(sink) => sink,
        }
    }
}

impl Sink for AnySink {
    #[inline]
    fn enqueue(&self, level: LogLevel, line: &str) {
        self.inner().enqueue(level, line);
    }

    fn flush(&self, force: bool) -> Result<()> {
        self.inner().flush(force)
    }

    fn prepare_for_period(&self, timestamp: DateTime<Local>) -> Result<()> {
        self.inner().prepare_for_period(timestamp)
    }

    fn dispose(&self) -> Result<()> {
        self.inner().dispose()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn metrics(&self) -> &SinkMetrics {
        self.inner().metrics()
    }
}

impl From<ConsoleSink> for AnySink {
    fn from(sink: ConsoleSink) -> Self {
        AnySink::Console(sink)
    }
}

impl From<FileSink> for AnySink {
    fn from(sink: FileSink) -> Self {
        AnySink::File(sink)
    }
}

impl fmt::Debug for AnySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnySink").field(&self.name()).finish()
    }
}

/// Bit-flag selection of the sinks a registry builds for a new logger
///
/// # Example
///
/// ```
/// use rust_logger_pipeline::SinkSet;
///
/// let sinks = SinkSet::FILE | SinkSet::CONSOLE;
/// assert_eq!(sinks, SinkSet::ALL);
/// assert!(sinks.contains(SinkSet::FILE));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkSet(u8);

impl SinkSet {
    pub const NONE: SinkSet = SinkSet(0);
    pub const FILE: SinkSet = SinkSet(1 << 0);
    pub const CONSOLE: SinkSet = SinkSet(1 << 1);
    pub const ALL: SinkSet = SinkSet(Self::FILE.0 | Self::CONSOLE.0);

    #[inline]
    pub const fn contains(self, other: SinkSet) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl Default for SinkSet {
    fn default() -> Self {
        SinkSet::ALL
    }
}

impl BitOr for SinkSet {
    type Output = SinkSet;

    fn bitor(self, rhs: SinkSet) -> SinkSet {
        SinkSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for SinkSet {
    fn bitor_assign(&mut self, rhs: SinkSet) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SinkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(SinkSet::FILE) {
            names.push("FILE");
        }
        if self.contains(SinkSet::CONSOLE) {
            names.push("CONSOLE");
        }
        if names.is_empty() {
            f.write_str("SinkSet(NONE)")
        } else {
            write!(f, "SinkSet({})", names.join(" | "))
        }
    }
}
