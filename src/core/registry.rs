//! Logger registry and the background flush/rotation scheduler
//!
//! The registry hands out one [`Logger`] per identity and owns a single
//! scheduler thread that, for every registered logger:
//!
//! - soft-flushes once per tick, so a file sink writes early once its
//!   backlog reaches `max_queue_size`;
//! - force-flushes every `max_log_age`;
//! - on a calendar day change, force-flushes and opens the new day's files.
//!
//! Shutdown is explicit: [`LoggerRegistry::shutdown`] signals the scheduler,
//! which force-flushes and disposes every logger before exiting.

use super::{
    clock::{Clock, SystemClock},
    config::LoggingConfig,
    error::{LoggerError, Result},
    logger::Logger,
    metrics::should_alert,
    sink::SinkSet,
};
use crate::sinks::{ConsoleSink, FileSink};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Name of the scheduler thread
pub const SCHEDULER_THREAD_NAME: &str = "logger-scheduler";

#[derive(Default)]
struct Registered {
    by_identity: HashMap<String, Arc<Logger>>,
    /// Registration order; the scheduler walks it newest first
    ordered: Vec<Arc<Logger>>,
}

/// State shared between the registry handle and the scheduler thread
struct Shared {
    config: LoggingConfig,
    clock: Arc<dyn Clock>,
    loggers: RwLock<Registered>,
    stopped: AtomicBool,
    scheduler_errors: AtomicU64,
}

impl Shared {
    fn snapshot(&self) -> Vec<Arc<Logger>> {
        self.loggers.read().ordered.clone()
    }

    fn build_logger(&self, identity: &str, sinks: SinkSet, display_name: Option<&str>) -> Logger {
        let name = display_name.unwrap_or(identity);
        let mut builder = Logger::builder(identity)
            .display_name(name)
            .clock(Arc::clone(&self.clock));
        if sinks.contains(SinkSet::FILE) {
            builder = builder.sink(
                FileSink::new(name, &self.config.log_directory, self.config.max_queue_size)
                    .with_compression(self.config.compress_rotated),
            );
        }
        if sinks.contains(SinkSet::CONSOLE) {
            builder = builder.sink(ConsoleSink::new(name));
        }
        builder.build()
    }

    /// Report a failed scheduler step without stopping the scheduler
    fn report(&self, step: &str, logger: &Logger, result: Result<()>) {
        if let Err(e) = result {
            let previous = self.scheduler_errors.fetch_add(1, Ordering::Relaxed);
            if should_alert(previous) {
                eprintln!(
                    "[LOGGER ERROR] Scheduler {} failed for logger '{}' ({} failures so far): {}",
                    step,
                    logger.identity(),
                    previous + 1,
                    e
                );
            }
        }
    }

    /// Final drain: flush and dispose every logger, newest first, and
    /// forget them
    fn drain(&self) {
        self.stopped.store(true, Ordering::Release);
        let registered = std::mem::take(&mut *self.loggers.write());
        for logger in registered.ordered.iter().rev() {
            self.report("final flush", logger, logger.flush(true));
            self.report("dispose", logger, logger.dispose());
        }
    }
}

struct SchedulerHandle {
    shutdown: Sender<()>,
    thread: thread::JoinHandle<()>,
}

struct Scheduler {
    shared: Arc<Shared>,
    shutdown: Receiver<()>,
}

impl Scheduler {
    fn run(self) {
        let shared = &self.shared;
        let max_log_age = shared.config.max_log_age();
        let tick = shared.config.tick();
        let mut current_day = shared.clock.now().date_naive();

        'cycle: loop {
            let now = shared.clock.now();
            if now.date_naive() != current_day {
                current_day = now.date_naive();
                for logger in shared.snapshot().iter().rev() {
                    shared.report("rotation flush", logger, logger.flush(true));
                    shared.report("rotation", logger, logger.prepare_for_period(now));
                }
            }

            let started = Instant::now();
            while started.elapsed() < max_log_age {
                for logger in shared.snapshot().iter().rev() {
                    shared.report("soft flush", logger, logger.flush(false));
                }
                match self.shutdown.recv_timeout(tick) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break 'cycle,
                }
            }

            for logger in shared.snapshot().iter().rev() {
                shared.report("forced flush", logger, logger.flush(true));
            }
        }

        shared.drain();
    }
}

/// Maps identities to loggers and drives their flushing and rotation
///
/// # Example
///
/// ```no_run
/// use rust_logger_pipeline::prelude::*;
///
/// let config = LoggingConfig::builder().log_directory("logs").build()?;
/// let registry = LoggerRegistry::new(config)?;
/// registry.start()?;
///
/// let logger = registry.get_logger("app::Server", SinkSet::ALL, Some("Server"))?;
/// logger.info("listening");
///
/// registry.shutdown()?;
/// # Ok::<(), LoggerError>(())
/// ```
pub struct LoggerRegistry {
    shared: Arc<Shared>,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

impl LoggerRegistry {
    /// Create a registry using the system clock; the scheduler is not
    /// started until [`start`](Self::start) is called
    pub fn new(config: LoggingConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: LoggingConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                clock,
                loggers: RwLock::new(Registered::default()),
                stopped: AtomicBool::new(false),
                scheduler_errors: AtomicU64::new(0),
            }),
            scheduler: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.shared.config
    }

    /// Spawn the scheduler thread
    ///
    /// # Errors
    ///
    /// [`LoggerError::SchedulerAlreadyRunning`] on a second call,
    /// [`LoggerError::LoggerStopped`] after shutdown.
    pub fn start(&self) -> Result<()> {
        let mut scheduler = self.scheduler.lock();
        if self.is_stopped() {
            return Err(LoggerError::LoggerStopped);
        }
        if scheduler.is_some() {
            return Err(LoggerError::SchedulerAlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = bounded(1);
        let worker = Scheduler {
            shared: Arc::clone(&self.shared),
            shutdown: shutdown_rx,
        };
        let thread = thread::Builder::new()
            .name(SCHEDULER_THREAD_NAME.to_string())
            .spawn(move || worker.run())
            .map_err(|e| {
                LoggerError::io_operation("spawning scheduler", SCHEDULER_THREAD_NAME, e)
            })?;

        *scheduler = Some(SchedulerHandle {
            shutdown: shutdown_tx,
            thread,
        });
        Ok(())
    }

    /// Logger registered under `identity`, created on first use
    ///
    /// A new logger gets a file sink and/or a console sink (in that order)
    /// as selected by `sinks`, named `display_name` or else `identity`, and
    /// is primed for the current period before being registered. Later
    /// calls return the same logger whatever `sinks` and `display_name`
    /// they pass.
    ///
    /// # Errors
    ///
    /// [`LoggerError::LoggerStopped`] after shutdown, or the priming error
    /// (for example an unusable log directory); nothing is registered then.
    pub fn get_logger(
        &self,
        identity: &str,
        sinks: SinkSet,
        display_name: Option<&str>,
    ) -> Result<Arc<Logger>> {
        if let Some(logger) = self.shared.loggers.read().by_identity.get(identity) {
            return Ok(Arc::clone(logger));
        }

        let mut registered = self.shared.loggers.write();
        if self.is_stopped() {
            return Err(LoggerError::LoggerStopped);
        }
        if let Some(logger) = registered.by_identity.get(identity) {
            return Ok(Arc::clone(logger));
        }

        let logger = Arc::new(self.shared.build_logger(identity, sinks, display_name));
        logger.prepare_for_period(self.shared.clock.now())?;

        registered
            .by_identity
            .insert(identity.to_owned(), Arc::clone(&logger));
        registered.ordered.push(Arc::clone(&logger));
        Ok(logger)
    }

    /// Registered loggers in registration order
    pub fn loggers(&self) -> Vec<Arc<Logger>> {
        self.shared.snapshot()
    }

    pub fn len(&self) -> usize {
        self.shared.loggers.read().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush every registered logger on the calling thread
    pub fn flush_all(&self, force: bool) -> Result<()> {
        let errors = self
            .shared
            .snapshot()
            .iter()
            .rev()
            .filter_map(|logger| logger.flush(force).err())
            .collect();
        LoggerError::collect(errors)
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.lock().is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }

    /// Scheduler steps that failed so far
    pub fn scheduler_error_count(&self) -> u64 {
        self.shared.scheduler_errors.load(Ordering::Relaxed)
    }

    /// Stop the scheduler and drain every logger
    ///
    /// Blocks until the scheduler has force-flushed and disposed every
    /// logger (newest first) and emptied the registry. Without a running
    /// scheduler the drain happens on the calling thread. Calling it again
    /// is a no-op.
    pub fn shutdown(&self) -> Result<()> {
        self.shared.stopped.store(true, Ordering::Release);

        let handle = self.scheduler.lock().take();
        match handle {
            Some(SchedulerHandle { shutdown, thread }) => {
                // A full channel means a signal is already pending
                let _ = shutdown.try_send(());
                drop(shutdown);
                if thread.join().is_err() {
                    self.shared.drain();
                    return Err(LoggerError::other("Logger scheduler thread panicked"));
                }
            }
            None => self.shared.drain(),
        }
        Ok(())
    }
}

impl Drop for LoggerRegistry {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            eprintln!("[LOGGER ERROR] Failed to shut down logger registry: {}", e);
        }
    }
}
