//! # Throttle Configuration
//!
//! Settings for [`RateWindowTracker`](super::RateWindowTracker). The limit is
//! chosen by deployment mode when the tracker is built and stays fixed for
//! the tracker's lifetime.
//!
//! ```text
//!     Mode          max_events_per_window   window_ms
//!     ──────────    ─────────────────────   ─────────
//!     Development   10                      1000
//!     Production     3                      1000
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event limit per window in development builds.
pub const DEVELOPMENT_MAX_EVENTS: u32 = 10;

/// Event limit per window in production builds.
pub const PRODUCTION_MAX_EVENTS: u32 = 3;

/// Default window length in milliseconds.
pub const DEFAULT_WINDOW_MS: u64 = 1000;

/// Default interval between reaper sweeps in milliseconds.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 250;

/// Deployment mode the application was assembled for.
///
/// Development mode is looser so that hot-reload and manual poking do not
/// trip the limiter; production is strict.
///
/// ```rust
/// use kalkulator::DeploymentMode;
///
/// let mode: DeploymentMode = "dev".parse().unwrap();
/// assert_eq!(mode, DeploymentMode::Development);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Looser limit (10 events per window)
    Development,

    /// Stricter limit (3 events per window)
    #[default]
    Production,
}

impl DeploymentMode {
    /// Event limit used by this mode.
    pub fn max_events_per_window(&self) -> u32 {
        match self {
            Self::Development => DEVELOPMENT_MAX_EVENTS,
            Self::Production => PRODUCTION_MAX_EVENTS,
        }
    }

    /// Returns `true` for development builds.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for DeploymentMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration for a [`RateWindowTracker`](super::RateWindowTracker).
///
/// ## Examples
///
/// ```rust
/// use kalkulator::{DeploymentMode, ThrottleConfig};
///
/// // Mode preset
/// let config = ThrottleConfig::for_mode(DeploymentMode::Development);
/// assert_eq!(config.max_events_per_window, 10);
///
/// // Custom limit and window
/// let config = ThrottleConfig::new(5, 2_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Events admitted per key before `can_admit` starts refusing.
    pub max_events_per_window: u32,

    /// Idle time after the last event before a key's count is forgotten.
    pub window_ms: u64,

    /// How often the reaper thread removes expired entries.
    ///
    /// Reads already ignore expired entries, so this only bounds how long
    /// they occupy memory.
    pub sweep_interval_ms: u64,
}

impl Default for ThrottleConfig {
    /// Production preset.
    fn default() -> Self {
        Self::for_mode(DeploymentMode::default())
    }
}

impl ThrottleConfig {
    /// Creates a configuration with an explicit limit and window.
    pub fn new(max_events_per_window: u32, window_ms: u64) -> Self {
        Self {
            max_events_per_window,
            window_ms,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }

    /// Preset for the given deployment mode with the default 1s window.
    pub fn for_mode(mode: DeploymentMode) -> Self {
        Self::new(mode.max_events_per_window(), DEFAULT_WINDOW_MS)
    }

    /// Sets the window length.
    pub fn with_window_ms(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms;
        self
    }

    /// Sets the event limit.
    pub fn with_max_events(mut self, max_events_per_window: u32) -> Self {
        self.max_events_per_window = max_events_per_window;
        self
    }

    /// Sets the reaper sweep interval.
    pub fn with_sweep_interval_ms(mut self, sweep_interval_ms: u64) -> Self {
        self.sweep_interval_ms = sweep_interval_ms;
        self
    }

    /// Checks that every parameter is positive.
    ///
    /// # Errors
    ///
    /// Returns the first zero-valued field as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_events_per_window == 0 {
            return Err(ConfigError::ZeroMaxEvents);
        }

        if self.window_ms == 0 {
            return Err(ConfigError::ZeroWindow);
        }

        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }

        Ok(())
    }
}
