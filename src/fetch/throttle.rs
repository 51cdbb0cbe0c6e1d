//! Outbound request throttle
//!
//! This module enforces two limits on requests to the source:
//! - A concurrency ceiling via a semaphore
//! - A minimum delay between consecutive request starts
//!
//! One throttle is built at startup and shared (`Arc`) by every fetch for the
//! lifetime of the process. Cancelling a single request releases its permit
//! but never resets the throttle. Closing it at shutdown refuses new requests
//! while `drain` still waits for the ones already running.

use crate::config::ThrottleConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Default concurrency ceiling for the source domain
pub const DEFAULT_MAX_CONCURRENT: u32 = 2;

/// Default spacing between request starts
pub const DEFAULT_MINIMUM_DELAY: Duration = Duration::from_secs(2);

/// Returned by `acquire` once the throttle has been closed
#[derive(Debug, Error)]
#[error("throttle is closed")]
pub struct ThrottleClosed;

/// Permit held for the duration of one request
///
/// Dropping it frees a concurrency slot.
#[derive(Debug)]
pub struct ThrottlePermit {
    _permit: OwnedSemaphorePermit,
}

/// Shared rate limiter for outbound fetches
#[derive(Debug)]
pub struct Throttle {
    /// Concurrency ceiling
    semaphore: Arc<Semaphore>,

    /// Total number of permits the semaphore was created with
    max_concurrent: u32,

    /// Minimum time between request starts
    minimum_delay: Duration,

    /// Start time of the most recent request
    last_request: Mutex<Option<Instant>>,

    /// Set once no further requests may start
    closed: AtomicBool,
}

impl Throttle {
    /// Creates a throttle
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Simultaneous requests allowed (at least 1)
    /// * `minimum_delay` - Spacing enforced between request starts
    pub fn new(max_concurrent: u32, minimum_delay: Duration) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent as usize)),
            max_concurrent,
            minimum_delay,
            last_request: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a throttle from configuration
    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(config.max_concurrent_requests, config.minimum_delay())
    }

    /// Creates a throttle with no delay, for tests and local tooling
    pub fn unthrottled() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT, Duration::ZERO)
    }

    /// Maximum simultaneous requests
    pub fn max_concurrent(&self) -> u32 {
        self.max_concurrent
    }

    /// Spacing enforced between request starts
    pub fn minimum_delay(&self) -> Duration {
        self.minimum_delay
    }

    /// Number of requests currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.max_concurrent as usize - self.semaphore.available_permits()
    }

    /// Waits until a request may start
    ///
    /// This method:
    /// 1. Acquires a concurrency permit
    /// 2. Sleeps until the minimum delay since the previous request start
    ///    has passed
    /// 3. Records the new request start and returns the permit
    ///
    /// The delay lock is held while sleeping so that concurrent callers are
    /// spaced one after another rather than all waking together.
    ///
    /// Fails only once the throttle has been closed.
    pub async fn acquire(&self) -> Result<ThrottlePermit, ThrottleClosed> {
        if self.is_closed() {
            return Err(ThrottleClosed);
        }

        // The semaphore itself is never closed, so this only fails if it is dropped
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ThrottleClosed)?;

        // Callers queued before close give their slot straight back
        if self.is_closed() {
            return Err(ThrottleClosed);
        }

        let mut last_request = self.last_request.lock().await;
        if let Some(wait) = time_until_next_request(*last_request, self.minimum_delay, Instant::now())
        {
            tracing::debug!("Throttling request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        *last_request = Some(Instant::now());

        Ok(ThrottlePermit { _permit: permit })
    }

    /// Refuses every request that has not started yet
    ///
    /// Requests already holding a permit run to completion.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Waits until no request holds a permit
    ///
    /// Used at shutdown to let in-flight fetches finish before exiting.
    pub async fn drain(&self) {
        match self.semaphore.acquire_many(self.max_concurrent).await {
            Ok(all) => drop(all),
            Err(_) => tracing::debug!("Throttle semaphore gone while draining"),
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT, DEFAULT_MINIMUM_DELAY)
    }
}

/// Calculates how long to wait before the next request may start
///
/// Returns None if a request can start now.
fn time_until_next_request(
    last: Option<Instant>,
    minimum_delay: Duration,
    now: Instant,
) -> Option<Duration> {
    let last = last?;
    let elapsed = now.saturating_duration_since(last);
    if elapsed < minimum_delay {
        Some(minimum_delay - elapsed)
    } else {
        None
    }
}
