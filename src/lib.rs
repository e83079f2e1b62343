//! # Kalkulator - Calculator Widget with a Per-Key Request Throttle
//!
//! Two independent pieces, composed by [`App`]:
//!
//! - **[`RateWindowTracker`]** - counts events per string key and refuses
//!   admission once a key has reached its limit inside the current window.
//! - **[`Calculator`]** - a four-function calculator driven one key press at
//!   a time, behind a text-rendered keypad ([`Shell`]).
//!
//! ## The Refresh-on-Activity Window
//!
//! Every recorded event pushes the key's reset deadline `window_ms` into the
//! future. A key only resets after a full window of silence:
//!
//! ```text
//!     limit = 3, window = 1000ms
//!
//!     t=0     record   count=1   reset at 1000
//!     t=400   record   count=2   reset at 1400
//!     t=800   record   count=3   reset at 1800
//!     t=900   can_admit?  ⛔ (3/3)
//!     t=1800  can_admit?  ✅ (window expired, count=0)
//! ```
//!
//! A steady stream of traffic therefore never resets, which is stricter
//! than a fixed or sliding window.
//!
//! ## Quick Start
//!
//! ```rust
//! use kalkulator::{DeploymentMode, RateWindowTracker};
//!
//! let tracker = RateWindowTracker::for_mode(DeploymentMode::Production);
//!
//! for _ in 0..3 {
//!     assert!(tracker.can_admit("weather-api"));
//!     tracker.record_event("weather-api");
//! }
//!
//! // Fourth request inside the window is refused
//! assert!(!tracker.can_admit("weather-api"));
//!
//! // Other keys are independent
//! assert!(tracker.can_admit("geo-api"));
//! ```
//!
//! ```rust
//! use kalkulator::{Calculator, Input};
//!
//! let mut calc = Calculator::new();
//! calc.press_all(Input::parse_sequence("1 . 1 + 1 . 9 =").unwrap());
//! assert_eq!(calc.display(), "3");
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │          App            │
//!                    └──────────┬──────────────┘
//!                               │
//!         ┌─────────────────────┼──────────────────────┐
//!         │                     │                      │
//!  ┌──────▼───────┐   ┌─────────▼─────────┐   ┌────────▼────────┐
//!  │ Shell        │   │ RateWindowTracker │◄──│ Session         │
//!  ├──────────────┤   ├───────────────────┤   ├─────────────────┤
//!  │ • Keypad     │   │ • DashMap entries │   │ • Directory     │
//!  │ • Calculator │   │ • reset deadlines │   │ • login/logout  │
//!  │ • render()   │   │ • reaper thread   │   └─────────────────┘
//!  └──────────────┘   └───────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! [`RateWindowTracker`] is `Send + Sync`; share it as a [`SharedTracker`].
//! The calculator and shell are plain single-owner values.
//!
//! ## Logging
//!
//! Events are emitted through `tracing`. The crate never installs a
//! subscriber; see `demos/` for one set up with `RUST_LOG`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    missing_debug_implementations
)]
#![forbid(unsafe_code)]

mod app;
mod auth;
mod calculator;
mod error;
mod shell;
mod throttle;

pub use app::{App, AppConfig, ThrottleOverrides, ENV_MAX_EVENTS, ENV_MODE, ENV_WINDOW_MS};
pub use auth::{Credential, Directory, Role, Session, User, LOGIN_THROTTLE_KEY};
pub use calculator::{Calculator, Input, Operator, Phase, ERROR_DISPLAY};
pub use error::{ConfigError, LoginError, UnknownInput};
pub use shell::{
    Button, ButtonVariant, Keypad, LandingPage, Shell, COLUMNS, ROWS, SUBTITLE, TITLE,
};
pub use throttle::{
    monotonic_ms, Clock, DeploymentMode, KeyCount, ManualClock, RateWindowTracker, SystemClock,
    ThrottleConfig, TrackerStats, DEFAULT_SWEEP_INTERVAL_MS, DEFAULT_WINDOW_MS,
    DEVELOPMENT_MAX_EVENTS, PRODUCTION_MAX_EVENTS,
};

use tracing::warn;

/// A tracker wrapped in `Arc` for sharing across threads.
///
/// # Example
/// ```rust
/// use kalkulator::{DeploymentMode, RateWindowTracker, SharedTracker};
/// use std::sync::Arc;
///
/// let shared: SharedTracker = Arc::new(RateWindowTracker::for_mode(DeploymentMode::Development));
///
/// let worker = shared.clone();
/// std::thread::spawn(move || worker.record_event("api"))
///     .join()
///     .unwrap();
///
/// assert_eq!(shared.count("api"), 1);
/// ```
pub type SharedTracker = std::sync::Arc<RateWindowTracker>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum supported Rust version.
pub const MSRV: &str = "1.70.0";

/// Prelude module for convenient imports.
pub mod prelude {
    //! Common imports.
    //!
    //! ```rust
    //! use kalkulator::prelude::*;
    //!
    //! let tracker = TrackerBuilder::new().mode(DeploymentMode::Development).build();
    //! let mut calc = Calculator::new();
    //! calc.press(Input::Digit(4));
    //! ```

    pub use crate::{
        App, AppConfig, Calculator, ConfigError, DeploymentMode, Input, Operator,
        RateWindowTracker, SharedTracker, Shell, ThrottleConfig, TrackerBuilder, TrackerStats,
    };
}

/// Builder for trackers with non-preset settings.
///
/// Starts from the preset of the chosen [`DeploymentMode`]; explicit values
/// override it.
///
/// # Example
///
/// ```rust
/// use kalkulator::{DeploymentMode, TrackerBuilder};
///
/// let tracker = TrackerBuilder::new()
///     .mode(DeploymentMode::Development)
///     .window_ms(5_000)
///     .build();
///
/// assert_eq!(tracker.config().max_events_per_window, 10);
/// assert_eq!(tracker.config().window_ms, 5_000);
///
/// // try_build() reports invalid settings
/// let result = TrackerBuilder::new().max_events(0).try_build();
/// assert!(result.is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrackerBuilder {
    mode: DeploymentMode,
    max_events: Option<u32>,
    window_ms: Option<u64>,
    sweep_interval_ms: Option<u64>,
}

impl TrackerBuilder {
    /// Creates a builder for the production preset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deployment mode whose preset fills unset values.
    pub fn mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the event limit per window.
    pub fn max_events(mut self, max_events: u32) -> Self {
        self.max_events = Some(max_events);
        self
    }

    /// Sets the window length in milliseconds.
    pub fn window_ms(mut self, ms: u64) -> Self {
        self.window_ms = Some(ms);
        self
    }

    /// Sets the reaper sweep interval in milliseconds.
    pub fn sweep_interval_ms(mut self, ms: u64) -> Self {
        self.sweep_interval_ms = Some(ms);
        self
    }

    /// The configuration this builder would produce, unvalidated.
    pub fn config(&self) -> ThrottleConfig {
        let preset = ThrottleConfig::for_mode(self.mode);

        ThrottleConfig {
            max_events_per_window: self.max_events.unwrap_or(preset.max_events_per_window),
            window_ms: self.window_ms.unwrap_or(preset.window_ms),
            sweep_interval_ms: self.sweep_interval_ms.unwrap_or(preset.sweep_interval_ms),
        }
    }

    /// Builds the tracker. Zero values fall back to the mode preset.
    pub fn build(self) -> RateWindowTracker {
        let preset = ThrottleConfig::for_mode(self.mode);
        let mut config = self.config();

        if config.max_events_per_window == 0 {
            warn!("max_events is zero, using {} preset", self.mode);
            config.max_events_per_window = preset.max_events_per_window;
        }
        if config.window_ms == 0 {
            warn!("window_ms is zero, using {} preset", self.mode);
            config.window_ms = preset.window_ms;
        }
        if config.sweep_interval_ms == 0 {
            warn!("sweep_interval_ms is zero, using {} preset", self.mode);
            config.sweep_interval_ms = preset.sweep_interval_ms;
        }

        match RateWindowTracker::new(config) {
            Ok(tracker) => tracker,
            Err(_) => RateWindowTracker::for_mode(self.mode),
        }
    }

    /// Builds the tracker, rejecting invalid settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any value is zero.
    pub fn try_build(self) -> Result<RateWindowTracker, ConfigError> {
        RateWindowTracker::new(self.config())
    }
}
