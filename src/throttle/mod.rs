//! # Request Throttle
//!
//! In-memory admission control for outbound calls.
//!
//! ```text
//!     throttle/
//!     ├── mod.rs          (module organization)
//!     ├── clock.rs        (time sources)
//!     ├── config.rs       (deployment modes and limits)
//!     ├── stats.rs        (snapshot rows and counters)
//!     └── tracker.rs      (per-key window tracker)
//! ```
//!
//! ```text
//!     caller ──► can_admit(key) ──► refused? ──► caller decides (drop / retry / queue)
//!                    │
//!                    ▼
//!               issue call
//!                    │
//!                    ▼
//!            record_event(key) ──► count += 1, reset @ now + window
//! ```

mod clock;
mod config;
mod stats;
mod tracker;

pub use clock::{monotonic_ms, Clock, ManualClock, SystemClock};
pub use config::{
    DeploymentMode, ThrottleConfig, DEFAULT_SWEEP_INTERVAL_MS, DEFAULT_WINDOW_MS,
    DEVELOPMENT_MAX_EVENTS, PRODUCTION_MAX_EVENTS,
};
pub use stats::{KeyCount, TrackerStats};
pub use tracker::RateWindowTracker;
