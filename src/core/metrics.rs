//! Sink metrics for observability
//!
//! Counters for monitoring a sink's health: how many entries it accepted,
//! wrote or dropped, how often it flushed and how many periods it opened.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one sink
///
/// # Example
///
/// ```
/// use rust_logger_pipeline::SinkMetrics;
///
/// let metrics = SinkMetrics::new();
///
/// metrics.record_enqueued();
/// metrics.record_written(1);
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.written(), 1);
/// ```
#[derive(Debug)]
pub struct SinkMetrics {
    /// Entries accepted by `enqueue`
    enqueued: AtomicU64,

    /// Entries that reached the output
    written: AtomicU64,

    /// Entries lost to write failures, a full buffer, or a disposed sink
    dropped: AtomicU64,

    /// Flushes that actually drained or flushed output
    flushes: AtomicU64,

    /// Forced flushes requested
    forced_flushes: AtomicU64,

    /// Successful `prepare_for_period` calls
    periods_opened: AtomicU64,

    /// Times the sink released its resources
    releases: AtomicU64,
}

impl SinkMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            forced_flushes: AtomicU64::new(0),
            periods_opened: AtomicU64::new(0),
            releases: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn forced_flushes(&self) -> u64 {
        self.forced_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn periods_opened(&self) -> u64 {
        self.periods_opened.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn releases(&self) -> u64 {
        self.releases.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self, count: u64) -> u64 {
        self.written.fetch_add(count, Ordering::Relaxed)
    }

    /// Record a dropped entry, returning the previous dropped count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_flush(&self) -> u64 {
        self.flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_forced_flush(&self) -> u64 {
        self.forced_flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_period_opened(&self) -> u64 {
        self.periods_opened.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_release(&self) -> u64 {
        self.releases.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been enqueued.
    pub fn drop_rate(&self) -> f64 {
        let enqueued = self.enqueued() as f64;
        if enqueued == 0.0 {
            0.0
        } else {
            (self.dropped() as f64 / enqueued) * 100.0
        }
    }
}

impl Default for SinkMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SinkMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            written: AtomicU64::new(self.written()),
            dropped: AtomicU64::new(self.dropped()),
            flushes: AtomicU64::new(self.flushes()),
            forced_flushes: AtomicU64::new(self.forced_flushes()),
            periods_opened: AtomicU64::new(self.periods_opened()),
            releases: AtomicU64::new(self.releases()),
        }
    }
}

/// Decide whether the `previous`-th failure (zero-based) deserves a report
///
/// Alerts on the first occurrence and periodically thereafter so a failing
/// disk does not flood stderr.
#[inline]
pub(crate) fn should_alert(previous: u64) -> bool {
    previous == 0 || (previous + 1) % 1000 == 0
}
