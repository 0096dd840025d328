//! Daily file sink implementation
//!
//! Caller threads only push formatted lines into an in-memory ring buffer.
//! The scheduler thread writes them out in batches and opens one file per
//! calendar day, named `<name>_<yyyy-MM-dd>.log`.

use crate::core::{
    log_entry::{period_file_name, validate_file_stem},
    metrics::should_alert,
    LogLevel, LoggerError, Result, RingBuffer, Sink, SinkMetrics,
};
use chrono::{DateTime, Local, NaiveDate};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Initial slot count of the staging buffers
const INITIAL_QUEUE_CAPACITY: usize = 32;

enum FileState {
    Closed,
    Open {
        day: NaiveDate,
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

/// State touched only while writing to disk
struct FileIo {
    /// Lines moved out of the queue and not yet written
    scratch: RingBuffer<String>,
    state: FileState,
}

/// Buffers lines in memory and writes them to a per-day file on flush
///
/// Two locks keep enqueueing cheap: the queue lock guards only the ring
/// buffer and is never held during disk I/O, while the I/O lock serializes
/// writers so lines reach the file in enqueue order.
///
/// # Example
///
/// ```no_run
/// use rust_logger_pipeline::prelude::*;
/// use chrono::Local;
///
/// let sink = FileSink::new("Foo", "logs", 100);
/// sink.prepare_for_period(Local::now())?;
/// sink.enqueue(LogLevel::Info, "formatted line");
/// sink.flush(true)?;
/// # Ok::<(), LoggerError>(())
/// ```
pub struct FileSink {
    name: String,
    sink_name: String,
    directory: PathBuf,
    max_queue_size: usize,
    compress_rotated: bool,
    queue: Mutex<RingBuffer<String>>,
    io: Mutex<FileIo>,
    disposed: AtomicBool,
    metrics: SinkMetrics,
}

impl FileSink {
    /// Create a closed file sink; call `prepare_for_period` to open a file
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>, max_queue_size: usize) -> Self {
        let name = name.into();
        Self {
            sink_name: format!("file:{}", name),
            name,
            directory: directory.into(),
            max_queue_size,
            compress_rotated: false,
            queue: Mutex::new(RingBuffer::with_capacity(INITIAL_QUEUE_CAPACITY)),
            io: Mutex::new(FileIo {
                scratch: RingBuffer::with_capacity(INITIAL_QUEUE_CAPACITY),
                state: FileState::Closed,
            }),
            disposed: AtomicBool::new(false),
            metrics: SinkMetrics::new(),
        }
    }

    /// Gzip the previous period's file whenever a new period opens
    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress_rotated = enabled;
        self
    }

    /// Cap the number of lines the sink buffers between flushes
    #[must_use]
    pub fn with_max_buffered(self, max_buffered: usize) -> Self {
        *self.queue.lock() = RingBuffer::with_max_capacity(INITIAL_QUEUE_CAPACITY, max_buffered);
        self
    }

    /// Path of the file currently open, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        match &self.io.lock().state {
            FileState::Open { path, .. } => Some(path.clone()),
            FileState::Closed => None,
        }
    }

    /// Day of the period currently open, if any
    pub fn current_day(&self) -> Option<NaiveDate> {
        match &self.io.lock().state {
            FileState::Open { day, .. } => Some(*day),
            FileState::Closed => None,
        }
    }

    /// Lines buffered and not yet handed to the writer
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Write every scratch line, dequeuing each one only once it is written
    fn write_scratch(
        scratch: &mut RingBuffer<String>,
        writer: &mut BufWriter<File>,
        path: &Path,
    ) -> Result<u64> {
        let mut written = 0;
        while let Some(line) = scratch.peek() {
            writer
                .write_all(line.as_bytes())
                .and_then(|()| writer.write_all(LINE_ENDING.as_bytes()))
                .map_err(|e| {
                    LoggerError::file_sink(
                        path.display().to_string(),
                        format!("Failed to write log entry: {}", e),
                    )
                })?;
            scratch.dequeue()?;
            written += 1;
        }
        Ok(written)
    }

    /// Close the open file, returning its path
    fn close(state: &mut FileState) -> Result<Option<PathBuf>> {
        match std::mem::replace(state, FileState::Closed) {
            FileState::Closed => Ok(None),
            FileState::Open {
                path, mut writer, ..
            } => {
                // Writer is dropped at the end of this arm, releasing the handle
                writer.flush().map_err(|e| {
                    LoggerError::file_rotation(
                        path.display().to_string(),
                        format!("Failed to flush before closing: {}", e),
                    )
                })?;
                Ok(Some(path))
            }
        }
    }

    fn flush_locked(&self, io: &mut FileIo, force: bool) -> Result<()> {
        let FileIo { scratch, state } = io;
        let (path, writer) = match state {
            FileState::Open { path, writer, .. } => (path.as_path(), writer),
            FileState::Closed => return Err(LoggerError::sink_closed(self.sink_name.clone())),
        };

        // Lines left over from a failed write go out first
        let mut written = Self::write_scratch(scratch, writer, path)?;

        {
            let mut queue = self.queue.lock();
            if !force && queue.len() < self.max_queue_size {
                drop(queue);
                if written > 0 {
                    self.finish_flush(writer, path, written)?;
                }
                return Ok(());
            }
            queue.drain_into(scratch);
        }

        written += Self::write_scratch(scratch, writer, path)?;
        self.finish_flush(writer, path, written)
    }

    fn finish_flush(&self, writer: &mut BufWriter<File>, path: &Path, written: u64) -> Result<()> {
        writer.flush().map_err(|e| {
            LoggerError::file_sink(
                path.display().to_string(),
                format!("Failed to flush: {}", e),
            )
        })?;
        self.metrics.record_written(written);
        self.metrics.record_flush();
        Ok(())
    }
}

impl Sink for FileSink {
    fn enqueue(&self, _level: LogLevel, line: &str) {
        self.metrics.record_enqueued();
        let line = line.to_owned();

        // Checked under the queue lock so nothing lands after the final drain
        let result = {
            let mut queue = self.queue.lock();
            if self.is_disposed() {
                None
            } else {
                Some(queue.enqueue(line))
            }
        };
        let Some(result) = result else {
            self.metrics.record_dropped();
            return;
        };
        if let Err(e) = result {
            let previous = self.metrics.record_dropped();
            if should_alert(previous) {
                eprintln!(
                    "[LOGGER ERROR] Sink '{}' dropped a line ({} so far): {}",
                    self.sink_name,
                    previous + 1,
                    e
                );
            }
        }
    }

    fn flush(&self, force: bool) -> Result<()> {
        let mut io = self.io.lock();
        if self.is_disposed() {
            return Ok(());
        }
        if force {
            self.metrics.record_forced_flush();
        }
        self.flush_locked(&mut io, force)
    }

    fn prepare_for_period(&self, timestamp: DateTime<Local>) -> Result<()> {
        if self.is_disposed() {
            return Err(LoggerError::sink_closed(self.sink_name.clone()));
        }

        // The name becomes part of a path; keep it inside the log directory
        validate_file_stem(&self.name)?;

        let day = timestamp.date_naive();
        let path = self.directory.join(period_file_name(&self.name, day));

        let mut io = self.io.lock();
        let previous = Self::close(&mut io.state)?;

        if self.compress_rotated {
            if let Some(previous) = previous.filter(|p| *p != path) {
                // A failed compression leaves the plain file in place
                if let Err(e) = compress_file(&previous) {
                    eprintln!(
                        "[LOGGER WARNING] Failed to compress '{}': {}",
                        previous.display(),
                        e
                    );
                }
            }
        }

        fs::create_dir_all(&self.directory).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", self.directory.display()),
                e,
            )
        })?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_sink(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        io.state = FileState::Open {
            day,
            path,
            writer: BufWriter::new(file),
        };
        self.metrics.record_period_opened();
        Ok(())
    }

    fn dispose(&self) -> Result<()> {
        let mut io = self.io.lock();
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.metrics.record_forced_flush();
        let flushed = if matches!(io.state, FileState::Open { .. }) {
            self.flush_locked(&mut io, true)
        } else {
            Ok(())
        };
        let closed = Self::close(&mut io.state);
        self.metrics.record_release();

        flushed?;
        closed.map(|_| ())
    }

    fn name(&self) -> &str {
        &self.sink_name
    }

    fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            eprintln!("[LOGGER ERROR] Failed to dispose sink '{}': {}", self.sink_name, e);
        }
    }
}

/// Gzip `path` into `<path>.gz`, then remove `path`
///
/// When the `.gz` file already exists the new data is appended as another
/// gzip member, which gzip readers decode as one stream.
#[cfg(feature = "compression")]
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let gz_path = path.with_extension("log.gz");
    let temp_gz_path = path.with_extension("log.gz.tmp");

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = std::io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut out| out.flush());
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress '{}'", path.display()),
            e,
        ));
    }

    let placed = if gz_path.exists() {
        OpenOptions::new()
            .append(true)
            .open(&gz_path)
            .and_then(|mut existing| {
                let mut compressed = Vec::new();
                File::open(&temp_gz_path)?.read_to_end(&mut compressed)?;
                existing.write_all(&compressed)
            })
            .and_then(|()| fs::remove_file(&temp_gz_path))
    } else {
        fs::rename(&temp_gz_path, &gz_path)
    };
    placed.map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to place compressed file: {}", gz_path.display()),
            e,
        )
    })?;

    // Only remove the original once the compressed copy is in place
    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compressed '{}' but failed to remove the original: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

#[cfg(not(feature = "compression"))]
fn compress_file(path: &Path) -> Result<()> {
    Err(LoggerError::config(
        "compress_rotated",
        format!(
            "cannot compress '{}': built without the `compression` feature",
            path.display()
        ),
    ))
}
