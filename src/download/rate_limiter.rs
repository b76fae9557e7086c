//! Fixed-interval pacing for catalog traversal.
//!
//! This module provides the [`Pacer`] struct which enforces a minimum interval
//! between consecutive node visits, keeping the request rate against the
//! remote service low enough to stay clear of abuse detection.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use docexport_core::download::Pacer;
//!
//! # async fn example() {
//! let pacer = Pacer::new(Duration::from_secs(1));
//!
//! // First acquire proceeds immediately
//! pacer.acquire().await;
//!
//! // Second acquire waits until one second has passed since the first
//! pacer.acquire().await;
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Default interval between consecutive node visits (1 second).
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_secs(1);

/// Minimum-interval rate limiter shared by every visit in a run.
///
/// The interval is measured between the *starts* of consecutive visits, so
/// time spent exporting a node counts toward the next wait.
#[derive(Debug)]
pub struct Pacer {
    /// Minimum time between consecutive acquires.
    interval: Duration,

    /// Whether pacing is disabled (interval of zero).
    disabled: bool,

    /// Time of the last acquire; `None` until the first one.
    last_acquire: Mutex<Option<Instant>>,

    /// Total time spent waiting, in milliseconds.
    total_wait_ms: AtomicU64,
}

impl Pacer {
    /// Creates a pacer with the given minimum interval.
    ///
    /// A zero interval yields a disabled pacer.
    #[must_use]
    #[instrument(skip_all, fields(interval_ms = interval.as_millis()))]
    pub fn new(interval: Duration) -> Self {
        if interval.is_zero() {
            return Self::disabled();
        }
        debug!("creating pacer");
        Self {
            interval,
            disabled: false,
            last_acquire: Mutex::new(None),
            total_wait_ms: AtomicU64::new(0),
        }
    }

    /// Creates a disabled pacer that never waits.
    #[must_use]
    pub fn disabled() -> Self {
        debug!("creating disabled pacer");
        Self {
            interval: Duration::ZERO,
            disabled: true,
            last_acquire: Mutex::new(None),
            total_wait_ms: AtomicU64::new(0),
        }
    }

    /// Returns whether pacing is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the configured interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the cumulative time spent waiting in [`acquire`](Self::acquire).
    #[must_use]
    pub fn total_wait(&self) -> Duration {
        Duration::from_millis(self.total_wait_ms.load(Ordering::SeqCst))
    }

    /// Waits until at least one interval has passed since the previous acquire.
    ///
    /// The first acquire proceeds immediately.
    pub async fn acquire(&self) {
        if self.disabled {
            return;
        }

        let mut last_acquire = self.last_acquire.lock().await;

        if let Some(previous) = *last_acquire {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let delay = self.interval.saturating_sub(elapsed);
                #[allow(clippy::cast_possible_truncation)]
                self.total_wait_ms
                    .fetch_add(delay.as_millis() as u64, Ordering::SeqCst);
                debug!(delay_ms = delay.as_millis(), "pacing before next node");
                tokio::time::sleep(delay).await;
            }
        }

        *last_acquire = Some(Instant::now());
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_INTERVAL)
    }
}
