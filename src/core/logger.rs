//! Per-identity logger fanning every call out to its sinks

use super::{
    clock::{Clock, SystemClock},
    error::{LoggerError, Result},
    log_entry::{error_chain_message, CallerLocation, LogEntry},
    log_level::LogLevel,
    sink::{AnySink, Sink},
};
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fan-out multiplexer over a fixed, ordered set of sinks
///
/// A log call formats its entry once and hands the line to every sink in
/// order; the logger keeps no buffer of its own. Log calls never fail from
/// the caller's point of view: sinks deal with their own errors.
pub struct Logger {
    identity: String,
    name: String,
    sinks: Vec<AnySink>,
    clock: Arc<dyn Clock>,
    disposed: AtomicBool,
}

impl Logger {
    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_logger_pipeline::prelude::*;
    ///
    /// let logger = Logger::builder("app::Server")
    ///     .display_name("Server")
    ///     .sink(ConsoleSink::new("Server"))
    ///     .build();
    ///
    /// logger.info("Server started");
    /// ```
    #[must_use]
    pub fn builder(identity: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(identity)
    }

    /// Key the logger is registered under
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Name written into every line and file name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sinks(&self) -> &[AnySink] {
        &self.sinks
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Log with an explicit caller location
    pub fn log_at(&self, level: LogLevel, message: impl AsRef<str>, location: CallerLocation) {
        let line = LogEntry::at(
            self.clock.now(),
            self.name.as_str(),
            level,
            message.as_ref(),
            location,
        )
        .render();
        for sink in &self.sinks {
            sink.enqueue(level, &line);
        }
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.log_at(level, message, CallerLocation::caller());
    }

    /// Log an error together with its chain of sources
    #[track_caller]
    pub fn log_error(&self, level: LogLevel, error: &(dyn std::error::Error + 'static)) {
        self.log_at(level, error_chain_message(error), CallerLocation::caller());
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    /// Flush every sink; a soft flush lets each sink skip small backlogs
    ///
    /// Every sink is flushed even when an earlier one fails; the failures
    /// are returned together.
    pub fn flush(&self, force: bool) -> Result<()> {
        self.fan_out(|sink| sink.flush(force))
    }

    /// Start the logging period containing `timestamp` on every sink
    pub fn prepare_for_period(&self, timestamp: DateTime<Local>) -> Result<()> {
        self.fan_out(|sink| sink.prepare_for_period(timestamp))
    }

    /// Dispose every sink. Only the first call has an effect.
    pub fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.fan_out(|sink| sink.dispose())
    }

    fn fan_out(&self, op: impl Fn(&AnySink) -> Result<()>) -> Result<()> {
        let errors: Vec<LoggerError> = self
            .sinks
            .iter()
            .filter_map(|sink| op(sink).err())
            .collect();
        LoggerError::collect(errors)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("identity", &self.identity)
            .field("name", &self.name)
            .field("sinks", &self.sinks)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
pub struct LoggerBuilder {
    identity: String,
    name: Option<String>,
    sinks: Vec<AnySink>,
    clock: Option<Arc<dyn Clock>>,
}

impl LoggerBuilder {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            name: None,
            sinks: Vec::new(),
            clock: None,
        }
    }

    /// Name used in lines and file names; defaults to the identity
    #[must_use = "builder methods return a new value"]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a sink; sinks receive entries in the order they were added
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: impl Into<AnySink>) -> Self {
        self.sinks.push(sink.into());
        self
    }

    /// Clock stamping every entry; defaults to the system clock
    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Logger {
        let name = self.name.unwrap_or_else(|| self.identity.clone());
        Logger {
            identity: self.identity,
            name,
            sinks: self.sinks,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            disposed: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{ConsoleSink, FileSink};
    use parking_lot::Mutex;
    use std::io::{self, Write};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().clone())
                .unwrap()
                .lines()
                .map(String::from)
                .collect()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_builder_defaults_name_to_identity() {
        let logger = Logger::builder("Foo").build();
        assert_eq!(logger.identity(), "Foo");
        assert_eq!(logger.name(), "Foo");
        assert!(logger.sinks().is_empty());
        logger.info("no sinks, no effect");
    }

    #[test]
    fn test_fan_out_equivalence() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let console = SharedBuffer::default();
        let logger = Logger::builder("Foo")
            .sink(FileSink::new("Foo", temp_dir.path(), 100))
            .sink(ConsoleSink::with_writer("Foo", console.clone()))
            .build();

        logger.prepare_for_period(Local::now()).unwrap();
        logger.info("hello");
        logger.flush(true).unwrap();

        let path = logger.sinks()[0].as_file().unwrap().current_path().unwrap();
        let file_lines: Vec<String> = std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect();
        let console_lines: Vec<String> = console
            .lines()
            .into_iter()
            .filter(|l| !l.starts_with("== log started"))
            .collect();

        assert_eq!(file_lines.len(), 1);
        assert_eq!(file_lines, console_lines);
        assert!(file_lines[0].contains("|Foo|Info ["));
        assert!(file_lines[0].ends_with("] hello"));
        assert!(file_lines[0].contains("logger.rs:"));
    }

    #[test]
    fn test_entries_use_logger_clock() {
        use crate::core::clock::ManualClock;
        use chrono::TimeZone;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let now = Local.with_ymd_and_hms(2024, 6, 1, 23, 59, 58).unwrap();
        let clock = Arc::new(ManualClock::new(now));
        let logger = Logger::builder("Foo")
            .sink(FileSink::new("Foo", temp_dir.path(), 100))
            .clock(clock.clone())
            .build();

        logger.prepare_for_period(clock.now()).unwrap();
        logger.info("stamped by the manual clock");
        logger.flush(true).unwrap();

        let content =
            std::fs::read_to_string(temp_dir.path().join("Foo_2024-06-01.log")).unwrap();
        assert!(content.starts_with("2024-06-01 23:59:58|Foo|Info ["));
    }

    #[test]
    fn test_log_error_renders_chain() {
        let console = SharedBuffer::default();
        let logger = Logger::builder("Foo")
            .sink(ConsoleSink::with_writer("Foo", console.clone()))
            .build();

        let err = LoggerError::io_operation(
            "opening",
            "config.json",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        logger.log_error(LogLevel::Error, &err);

        let lines = console.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("|Error ["));
        assert!(lines[0].ends_with("IO error while opening: config.json: missing"));
    }

    #[test]
    fn test_failing_sink_does_not_stop_fan_out() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let logger = Logger::builder("Foo")
            // Never prepared, so flushing it fails
            .sink(FileSink::new("Foo", temp_dir.path(), 100))
            .sink(ConsoleSink::with_writer("Foo", SharedBuffer::default()))
            .build();

        let err = logger.flush(true).unwrap_err();
        assert!(matches!(err, LoggerError::SinkClosed { .. }));
        assert_eq!(logger.sinks()[1].metrics().forced_flushes(), 1);
    }

    #[test]
    fn test_dispose_twice() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let logger = Logger::builder("Foo")
            .sink(FileSink::new("Foo", temp_dir.path(), 100))
            .sink(ConsoleSink::with_writer("Foo", SharedBuffer::default()))
            .build();
        logger.prepare_for_period(Local::now()).unwrap();
        logger.info("pending");

        logger.dispose().unwrap();
        logger.dispose().unwrap();

        assert!(logger.is_disposed());
        for sink in logger.sinks() {
            assert_eq!(sink.metrics().forced_flushes(), 1, "{}", sink.name());
            assert_eq!(sink.metrics().releases(), 1, "{}", sink.name());
        }
        assert_eq!(logger.sinks()[0].metrics().written(), 1);
    }
}
