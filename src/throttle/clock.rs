//! # Time Sources
//!
//! The tracker reads time through the [`Clock`] trait so that window expiry
//! can be driven by hand in tests.
//!
//! ```text
//!     SystemClock ──► monotonic ms since process start (never jumps back)
//!     ManualClock ──► shared counter, advanced explicitly
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

// Captured on first use; every SystemClock reading is relative to it, so a
// wall-clock change cannot shorten or stretch a window.
static START_INSTANT: OnceLock<Instant> = OnceLock::new();

/// A millisecond time source.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds. Must be monotonic non-decreasing.
    fn now_ms(&self) -> u64;
}

/// Monotonic clock backed by [`Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline(always)]
    fn now_ms(&self) -> u64 {
        monotonic_ms()
    }
}

/// Milliseconds elapsed since the first call in this process.
///
/// ```rust
/// use kalkulator::monotonic_ms;
///
/// let a = monotonic_ms();
/// let b = monotonic_ms();
/// assert!(b >= a);
/// ```
#[inline(always)]
pub fn monotonic_ms() -> u64 {
    let start = START_INSTANT.get_or_init(Instant::now);
    start.elapsed().as_millis() as u64
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same underlying time, so a clone kept by the test can
/// advance the clock a tracker owns.
///
/// ```rust
/// use kalkulator::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(250);
/// assert_eq!(clock.now_ms(), 250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Starts at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts at the given time.
    pub fn starting_at(ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(ms)),
        }
    }

    /// Moves time forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::AcqRel);
    }

    /// Jumps to an absolute time. Going backwards is ignored.
    pub fn set(&self, ms: u64) {
        self.now.fetch_max(ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}
