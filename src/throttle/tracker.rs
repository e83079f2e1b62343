//! # Per-Key Window Tracker
//!
//! Admission control for outbound calls. Each resource key (an endpoint
//! name, a call site) gets a counter that lives until the key has been quiet
//! for one full window.
//!
//! ## Refresh-on-Activity Windows
//!
//! ```text
//!     window_ms = 1000, max = 3
//!
//!     t=0     record ──► count 1, reset @1000
//!     t=400   record ──► count 2, reset @1400   (old reset cancelled)
//!     t=900   record ──► count 3, reset @1900
//!     t=950   can_admit? 3 >= 3 ──► refused
//!     t=1900  reset fires ──► key forgotten, admits again
//! ```
//!
//! Every event pushes the reset a full window out, so a key that never goes
//! quiet for `window_ms` never resets. This is not a sliding log or a token
//! bucket and does not bound sustained throughput.
//!
//! ## Scheduled Resets
//!
//! The pending reset of a key is the deadline stored on its entry.
//! Rescheduling overwrites the deadline; `reset_all` drops every entry and
//! with it every deadline. Reads treat an entry past its deadline as absent,
//! and [`RateWindowTracker::purge_expired`] (run by the reaper thread)
//! removes it from the map.

use super::{
    clock::{Clock, SystemClock},
    config::{DeploymentMode, ThrottleConfig},
    stats::{KeyCount, TrackerStats},
};
use crate::error::ConfigError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Count and reset deadline for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowEntry {
    count: u32,
    expires_at_ms: u64,
}

impl WindowEntry {
    #[inline]
    fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Per-key event counter with refresh-on-activity expiry.
///
/// Callers check [`can_admit`](Self::can_admit) before issuing a call and
/// [`record_event`](Self::record_event) after issuing it. The tracker never
/// performs or blocks the call itself.
///
/// One instance is meant to be shared by the whole application; build it once
/// and hand out `Arc` clones.
///
/// ## Example
///
/// ```rust
/// use kalkulator::{DeploymentMode, RateWindowTracker};
///
/// let tracker = RateWindowTracker::for_mode(DeploymentMode::Production);
///
/// for _ in 0..3 {
///     assert!(tracker.can_admit("api/rates"));
///     tracker.record_event("api/rates");
/// }
///
/// // Fourth call inside the window is refused
/// assert!(!tracker.can_admit("api/rates"));
///
/// // Other keys are unaffected
/// assert!(tracker.can_admit("api/users"));
/// ```
pub struct RateWindowTracker<C: Clock = SystemClock> {
    /// Key to live window. An entry is the key's count and its one pending reset.
    windows: DashMap<String, WindowEntry, ahash::RandomState>,

    config: ThrottleConfig,

    clock: C,

    total_recorded: AtomicU64,
    total_refused: AtomicU64,
    total_expired: AtomicU64,
    total_resets: AtomicU64,
}

impl RateWindowTracker<SystemClock> {
    /// Creates a tracker on the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any configured value is zero.
    ///
    /// ```rust
    /// use kalkulator::{RateWindowTracker, ThrottleConfig};
    ///
    /// let tracker = RateWindowTracker::new(ThrottleConfig::new(5, 2_000)).unwrap();
    /// assert!(RateWindowTracker::new(ThrottleConfig::new(0, 2_000)).is_err());
    /// # drop(tracker);
    /// ```
    pub fn new(config: ThrottleConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }

    /// Creates a tracker with the preset for `mode`.
    pub fn for_mode(mode: DeploymentMode) -> Self {
        Self::from_parts(ThrottleConfig::for_mode(mode), SystemClock)
    }
}

impl<C: Clock> RateWindowTracker<C> {
    /// Creates a tracker reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any configured value is zero.
    pub fn with_clock(config: ThrottleConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(config, clock))
    }

    fn from_parts(config: ThrottleConfig, clock: C) -> Self {
        Self {
            windows: DashMap::with_hasher(ahash::RandomState::new()),
            config,
            clock,
            total_recorded: AtomicU64::new(0),
            total_refused: AtomicU64::new(0),
            total_expired: AtomicU64::new(0),
            total_resets: AtomicU64::new(0),
        }
    }

    /// Returns `true` if `key` is below the limit in its current window.
    ///
    /// Unknown and expired keys always admit. Window state is not touched;
    /// a refusal is logged at warn level and counted in [`stats`](Self::stats).
    pub fn can_admit(&self, key: &str) -> bool {
        let count = self.count(key);
        let max = self.config.max_events_per_window;

        if count >= max {
            warn!("Request rate limit exceeded for {}: {}/{}", key, count, max);
            self.total_refused.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        true
    }

    /// Counts one event for `key` and reschedules its reset to one full
    /// window from now, cancelling the previous one.
    ///
    /// Always succeeds, whether or not the caller checked
    /// [`can_admit`](Self::can_admit) first.
    pub fn record_event(&self, key: &str) {
        let now_ms = self.clock.now_ms();
        let expires_at_ms = now_ms.saturating_add(self.config.window_ms);
        self.total_recorded.fetch_add(1, Ordering::Relaxed);

        // Fast path: the key already has an entry, no key allocation needed
        if let Some(mut entry) = self.windows.get_mut(key) {
            self.bump(entry.value_mut(), now_ms, expires_at_ms);
            return;
        }

        match self.windows.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                // Inserted by another thread between the two lookups
                self.bump(occupied.get_mut(), now_ms, expires_at_ms);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(WindowEntry {
                    count: 1,
                    expires_at_ms,
                });
                debug!("Opened window for {} (reset at {}ms)", key, expires_at_ms);
            }
        }
    }

    fn bump(&self, entry: &mut WindowEntry, now_ms: u64, expires_at_ms: u64) {
        if entry.is_expired(now_ms) {
            // Reset already due; start a fresh window instead of resurrecting the old count
            self.total_expired.fetch_add(1, Ordering::Relaxed);
            entry.count = 0;
        }

        entry.count = entry.count.saturating_add(1);
        entry.expires_at_ms = expires_at_ms;
    }

    /// Checks admission and, if admitted, records the event.
    ///
    /// Same outcome as `can_admit` followed by `record_event`, but the check
    /// and the increment happen under one shard lock, so concurrent callers
    /// on the same key never admit more than `max_events_per_window`.
    pub fn try_admit(&self, key: &str) -> bool {
        let now_ms = self.clock.now_ms();
        let expires_at_ms = now_ms.saturating_add(self.config.window_ms);

        // Fast path: the key already has an entry, no key allocation needed
        if let Some(mut entry) = self.windows.get_mut(key) {
            return self.admit(key, entry.value_mut(), now_ms, expires_at_ms);
        }

        match self.windows.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                self.admit(key, occupied.get_mut(), now_ms, expires_at_ms)
            }
            Entry::Vacant(vacant) => {
                // max_events_per_window >= 1, so a fresh key always admits
                self.total_recorded.fetch_add(1, Ordering::Relaxed);
                vacant.insert(WindowEntry {
                    count: 1,
                    expires_at_ms,
                });
                debug!("Opened window for {} (reset at {}ms)", key, expires_at_ms);
                true
            }
        }
    }

    fn admit(&self, key: &str, entry: &mut WindowEntry, now_ms: u64, expires_at_ms: u64) -> bool {
        let count = if entry.is_expired(now_ms) { 0 } else { entry.count };
        let max = self.config.max_events_per_window;

        if count >= max {
            warn!("Request rate limit exceeded for {}: {}/{}", key, count, max);
            self.total_refused.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.total_recorded.fetch_add(1, Ordering::Relaxed);
        self.bump(entry, now_ms, expires_at_ms);
        true
    }

    /// Cancels every pending reset and forgets every count.
    pub fn reset_all(&self) {
        let cleared = self.windows.len();
        self.windows.clear();
        self.total_resets.fetch_add(1, Ordering::Relaxed);
        info!("Reset all throttle windows ({} cleared)", cleared);
    }

    /// Live `(key, count)` pairs, in no particular order.
    pub fn snapshot(&self) -> Vec<KeyCount> {
        let now_ms = self.clock.now_ms();

        self.windows
            .iter()
            .filter(|entry| !entry.value().is_expired(now_ms))
            .map(|entry| KeyCount {
                key: entry.key().clone(),
                count: entry.value().count,
            })
            .collect()
    }

    /// Events recorded for `key` in its live window, 0 if none.
    pub fn count(&self, key: &str) -> u32 {
        let now_ms = self.clock.now_ms();

        self.windows
            .get(key)
            .filter(|entry| !entry.is_expired(now_ms))
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    /// Milliseconds until `key`'s pending reset fires, or `None` when the
    /// key has no live window.
    pub fn expires_in_ms(&self, key: &str) -> Option<u64> {
        let now_ms = self.clock.now_ms();

        self.windows
            .get(key)
            .filter(|entry| !entry.is_expired(now_ms))
            .map(|entry| entry.expires_at_ms - now_ms)
    }

    /// Number of keys with a live window.
    pub fn tracked_keys(&self) -> usize {
        let now_ms = self.clock.now_ms();

        self.windows
            .iter()
            .filter(|entry| !entry.value().is_expired(now_ms))
            .count()
    }

    /// Fires every reset whose deadline has passed.
    ///
    /// Returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let mut removed = 0;

        self.windows.retain(|key, entry| {
            if entry.is_expired(now_ms) {
                debug!("Window for {} elapsed (count was {})", key, entry.count);
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.total_expired.fetch_add(removed as u64, Ordering::Relaxed);
            debug!("Purged {} expired throttle windows", removed);

            // Give memory back after a burst of distinct keys dies down
            let capacity = self.windows.capacity();
            if capacity > 1024 && capacity > self.windows.len() * 4 {
                self.windows.shrink_to_fit();
            }
        }

        removed
    }

    /// Current configuration.
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Clock this tracker reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Counters and current size.
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            tracked_keys: self.tracked_keys(),
            max_events_per_window: self.config.max_events_per_window,
            window_ms: self.config.window_ms,
            total_recorded: self.total_recorded.load(Ordering::Relaxed),
            total_refused: self.total_refused.load(Ordering::Relaxed),
            total_expired: self.total_expired.load(Ordering::Relaxed),
            total_resets: self.total_resets.load(Ordering::Relaxed),
        }
    }
}

impl<C: Clock + 'static> RateWindowTracker<C> {
    /// Starts a background thread that calls
    /// [`purge_expired`](Self::purge_expired) every `sweep_interval_ms`.
    ///
    /// Send `()` on the returned channel, or drop it, to stop the thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use kalkulator::{DeploymentMode, RateWindowTracker};
    ///
    /// let tracker = Arc::new(RateWindowTracker::for_mode(DeploymentMode::Development));
    /// let (handle, stop_tx) = tracker.clone().start_reaper_thread().unwrap();
    ///
    /// stop_tx.send(()).unwrap();
    /// handle.join().unwrap();
    /// ```
    pub fn start_reaper_thread(
        self: Arc<Self>,
    ) -> io::Result<(thread::JoinHandle<()>, mpsc::Sender<()>)> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let tracker = self;
        let interval = Duration::from_millis(tracker.config.sweep_interval_ms);

        let handle = thread::Builder::new()
            .name("throttle-reaper".to_string())
            .spawn(move || {
                info!(
                    "Started throttle reaper (interval: {}ms, window: {}ms)",
                    tracker.config.sweep_interval_ms, tracker.config.window_ms
                );

                loop {
                    match stop_rx.recv_timeout(interval) {
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                            info!("Throttle reaper stopping");
                            break;
                        }
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            tracker.purge_expired();
                        }
                    }
                }
            })?;

        Ok((handle, stop_tx))
    }
}

impl<C: Clock> std::fmt::Debug for RateWindowTracker<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateWindowTracker")
            .field("tracked_keys", &self.tracked_keys())
            .field("max_events_per_window", &self.config.max_events_per_window)
            .field("window_ms", &self.config.window_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throttle::clock::ManualClock;

    fn tracker(max: u32, window_ms: u64) -> (RateWindowTracker<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let tracker =
            RateWindowTracker::with_clock(ThrottleConfig::new(max, window_ms), clock.clone())
                .unwrap();
        (tracker, clock)
    }

    #[test]
    fn test_unknown_key_admits() {
        let (tracker, _) = tracker(3, 1000);

        assert!(tracker.can_admit("never-seen"));
        assert_eq!(tracker.count("never-seen"), 0);
        assert!(tracker.snapshot().is_empty());
        assert_eq!(tracker.expires_in_ms("never-seen"), None);
    }

    #[test]
    fn test_limit_boundary() {
        let (tracker, _) = tracker(3, 1000);

        for _ in 0..2 {
            tracker.record_event("api");
        }
        assert!(tracker.can_admit("api"));

        tracker.record_event("api");
        assert!(!tracker.can_admit("api"));
        assert_eq!(tracker.count("api"), 3);
    }

    #[test]
    fn test_can_admit_does_not_mutate() {
        let (tracker, _) = tracker(1, 1000);

        tracker.record_event("api");
        for _ in 0..5 {
            assert!(!tracker.can_admit("api"));
        }

        assert_eq!(tracker.count("api"), 1);
        assert_eq!(tracker.stats().total_refused, 5);
        assert_eq!(tracker.stats().total_recorded, 1);
    }

    #[test]
    fn test_record_event_without_admission_check() {
        let (tracker, _) = tracker(2, 1000);

        for _ in 0..5 {
            tracker.record_event("api");
        }

        assert_eq!(tracker.count("api"), 5);
        assert!(!tracker.can_admit("api"));
    }

    #[test]
    fn test_window_elapses() {
        let (tracker, clock) = tracker(2, 1000);

        tracker.record_event("api");
        tracker.record_event("api");
        assert!(!tracker.can_admit("api"));

        clock.advance(999);
        assert!(!tracker.can_admit("api"));
        assert_eq!(tracker.expires_in_ms("api"), Some(1));

        clock.advance(1);
        assert!(tracker.can_admit("api"));
        assert_eq!(tracker.count("api"), 0);
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn test_reset_is_pushed_forward_by_each_event() {
        let (tracker, clock) = tracker(10, 1000);

        tracker.record_event("api");
        clock.advance(600);
        tracker.record_event("api");
        assert_eq!(tracker.expires_in_ms("api"), Some(1000));

        // Past the first event's deadline, still inside the second's
        clock.advance(600);
        assert_eq!(tracker.count("api"), 2);

        clock.advance(400);
        assert_eq!(tracker.count("api"), 0);
    }

    #[test]
    fn test_continuous_activity_never_resets() {
        let (tracker, clock) = tracker(3, 1000);

        for _ in 0..20 {
            tracker.record_event("busy");
            clock.advance(900);
        }

        assert_eq!(tracker.count("busy"), 20);
        assert!(!tracker.can_admit("busy"));
    }

    #[test]
    fn test_record_after_expiry_starts_fresh() {
        let (tracker, clock) = tracker(3, 1000);

        tracker.record_event("api");
        tracker.record_event("api");
        clock.advance(1500);

        // Entry still physically present, but its reset is overdue
        tracker.record_event("api");
        assert_eq!(tracker.count("api"), 1);
        assert_eq!(tracker.stats().total_expired, 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let (tracker, clock) = tracker(1, 1000);

        tracker.record_event("a");
        clock.advance(500);
        tracker.record_event("b");

        assert!(!tracker.can_admit("a"));
        assert!(!tracker.can_admit("b"));

        clock.advance(500);
        assert!(tracker.can_admit("a"));
        assert!(!tracker.can_admit("b"));
    }

    #[test]
    fn test_reset_all() {
        let (tracker, _) = tracker(1, 1000);

        for key in ["a", "b", "c"] {
            tracker.record_event(key);
            assert!(!tracker.can_admit(key));
        }

        tracker.reset_all();

        for key in ["a", "b", "c"] {
            assert!(tracker.can_admit(key));
        }
        assert!(tracker.snapshot().is_empty());
        assert_eq!(tracker.stats().total_resets, 1);
    }

    #[test]
    fn test_snapshot() {
        let (tracker, clock) = tracker(5, 1000);

        tracker.record_event("a");
        tracker.record_event("a");
        clock.advance(500);
        tracker.record_event("b");
        clock.advance(500);

        // "a" has elapsed, "b" is live
        let snapshot = tracker.snapshot();
        assert_eq!(
            snapshot,
            vec![KeyCount {
                key: "b".to_string(),
                count: 1
            }]
        );

        // Snapshot does not purge
        assert_eq!(tracker.windows.len(), 2);
    }

    #[test]
    fn test_purge_expired() {
        let (tracker, clock) = tracker(5, 1000);

        for i in 0..10 {
            tracker.record_event(&format!("key-{}", i));
        }
        clock.advance(500);
        tracker.record_event("key-0");
        clock.advance(500);

        assert_eq!(tracker.purge_expired(), 9);
        assert_eq!(tracker.windows.len(), 1);
        assert_eq!(tracker.tracked_keys(), 1);
        assert_eq!(tracker.stats().total_expired, 9);

        // Nothing left to purge
        assert_eq!(tracker.purge_expired(), 0);
    }

    #[test]
    fn test_try_admit() {
        let (tracker, _) = tracker(2, 1000);

        assert!(tracker.try_admit("api"));
        assert!(tracker.try_admit("api"));
        assert!(!tracker.try_admit("api"));
        assert_eq!(tracker.count("api"), 2);

        let stats = tracker.stats();
        assert_eq!(stats.total_recorded, 2);
        assert_eq!(stats.total_refused, 1);
    }

    #[test]
    fn test_try_admit_after_expiry() {
        let (tracker, clock) = tracker(1, 1000);

        assert!(tracker.try_admit("api"));
        assert!(!tracker.try_admit("api"));

        clock.advance(1000);
        assert!(tracker.try_admit("api"));
        assert_eq!(tracker.count("api"), 1);
        assert_eq!(tracker.expires_in_ms("api"), Some(1000));
    }

    #[test]
    fn test_concurrent_try_admit_shared_key() {
        use std::sync::Barrier;

        const THREADS: usize = 8;

        for _ in 0..200 {
            let clock = ManualClock::new();
            let tracker = Arc::new(
                RateWindowTracker::with_clock(ThrottleConfig::new(2, 1000), clock).unwrap(),
            );
            let barrier = Arc::new(Barrier::new(THREADS));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let tracker = tracker.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        tracker.try_admit("shared")
                    })
                })
                .collect();

            let admitted = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|admitted| *admitted)
                .count();

            assert_eq!(admitted, 2);
            assert_eq!(tracker.count("shared"), 2);
            assert_eq!(tracker.stats().total_refused, (THREADS - 2) as u64);
        }
    }

    #[test]
    fn test_for_mode_limits() {
        let dev = RateWindowTracker::for_mode(DeploymentMode::Development);
        let prod = RateWindowTracker::for_mode(DeploymentMode::Production);

        for _ in 0..3 {
            dev.record_event("api");
            prod.record_event("api");
        }

        assert!(dev.can_admit("api"));
        assert!(!prod.can_admit("api"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = RateWindowTracker::new(ThrottleConfig::new(3, 0));
        assert_eq!(result.err(), Some(ConfigError::ZeroWindow));
    }

    #[test]
    fn test_concurrent_record() {
        let clock = ManualClock::new();
        let tracker = Arc::new(
            RateWindowTracker::with_clock(ThrottleConfig::new(1000, 1000), clock).unwrap(),
        );
        let mut handles = vec![];

        for _ in 0..8 {
            let tracker = tracker.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    tracker.record_event("shared");
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.count("shared"), 800);
        assert_eq!(tracker.stats().total_recorded, 800);
    }

    #[test]
    fn test_reaper_thread_with_manual_clock() {
        let clock = ManualClock::new();
        let config = ThrottleConfig::new(3, 1000).with_sweep_interval_ms(5);
        let tracker = Arc::new(RateWindowTracker::with_clock(config, clock.clone()).unwrap());

        tracker.record_event("api");
        let (handle, stop_tx) = tracker.clone().start_reaper_thread().unwrap();

        clock.advance(1000);
        thread::sleep(Duration::from_millis(100));

        assert_eq!(tracker.windows.len(), 0);

        stop_tx.send(()).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_debug_impl() {
        let (tracker, _) = tracker(3, 1000);
        tracker.record_event("api");

        let debug = format!("{:?}", tracker);
        assert!(debug.contains("RateWindowTracker"));
        assert!(debug.contains("tracked_keys: 1"));
    }
}
