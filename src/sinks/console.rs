//! Console sink implementation

use crate::core::{
    log_entry::LINE_TIMESTAMP_FORMAT, metrics::should_alert, LogLevel, LoggerError, Result, Sink,
    SinkMetrics,
};
use chrono::{DateTime, Local};
use colored::Colorize;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Writes every line synchronously on the calling thread
///
/// Lines are colored by level when colors are enabled. The color applies to
/// one line only, so the terminal's previous color is back in effect once
/// the line is written.
pub struct ConsoleSink {
    name: String,
    sink_name: String,
    use_colors: bool,
    output: Mutex<Box<dyn Write + Send>>,
    disposed: AtomicBool,
    metrics: SinkMetrics,
}

impl ConsoleSink {
    /// Console sink on standard output, with colors
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_writer(name, io::stdout()).with_colors(true)
    }

    /// Console sink on an arbitrary writer, without colors
    pub fn with_writer<W: Write + Send + 'static>(name: impl Into<String>, writer: W) -> Self {
        let name = name.into();
        Self {
            sink_name: format!("console:{}", name),
            name,
            use_colors: false,
            output: Mutex::new(Box::new(writer)),
            disposed: AtomicBool::new(false),
            metrics: SinkMetrics::new(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut output = self.output.lock();
        writeln!(output, "{}", line)
    }

    fn report_dropped(&self, error: &io::Error) {
        let previous = self.metrics.record_dropped();
        if should_alert(previous) {
            eprintln!(
                "[LOGGER ERROR] Sink '{}' failed to write ({} lines dropped so far): {}",
                self.sink_name,
                previous + 1,
                error
            );
        }
    }
}

impl Sink for ConsoleSink {
    fn enqueue(&self, level: LogLevel, line: &str) {
        self.metrics.record_enqueued();
        if self.is_disposed() {
            self.metrics.record_dropped();
            return;
        }

        let result = if self.use_colors {
            self.write_line(&line.color(level.color_code()).to_string())
        } else {
            self.write_line(line)
        };

        match result {
            Ok(()) => {
                self.metrics.record_written(1);
            }
            Err(e) => self.report_dropped(&e),
        }
    }

    fn flush(&self, force: bool) -> Result<()> {
        if !force {
            return Ok(());
        }
        self.metrics.record_forced_flush();
        self.output.lock().flush().map_err(|e| {
            LoggerError::io_operation("flushing console", self.sink_name.clone(), e)
        })?;
        self.metrics.record_flush();
        Ok(())
    }

    fn prepare_for_period(&self, timestamp: DateTime<Local>) -> Result<()> {
        if self.is_disposed() {
            return Err(LoggerError::sink_closed(self.sink_name.clone()));
        }
        self.write_line(&format!(
            "== log started {} {} ==",
            self.name,
            timestamp.format(LINE_TIMESTAMP_FORMAT)
        ))
        .map_err(|e| {
            LoggerError::io_operation("writing period banner", self.sink_name.clone(), e)
        })?;
        self.metrics.record_period_opened();
        Ok(())
    }

    fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let result = self.flush(true);
        self.metrics.record_release();
        result
    }

    fn name(&self) -> &str {
        &self.sink_name
    }

    fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}
