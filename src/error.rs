//! Error types.
//!
//! The throttler itself never fails; these cover configuration, keypad input
//! parsing and the decorative login flow.

/// Invalid tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `max_events_per_window` was zero
    #[error("max_events_per_window must be greater than 0")]
    ZeroMaxEvents,

    /// `window_ms` was zero
    #[error("window_ms must be greater than 0")]
    ZeroWindow,

    /// `sweep_interval_ms` was zero
    #[error("sweep_interval_ms must be greater than 0")]
    ZeroSweepInterval,

    /// Unrecognised deployment mode string
    #[error("unknown deployment mode: {0}")]
    UnknownMode(String),

    /// An environment override could not be parsed
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// A keypad label that maps to no calculator input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown calculator input: {0}")]
pub struct UnknownInput(pub String);

/// Login failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// Too many login attempts inside the current window
    #[error("too many login attempts, try again later")]
    Throttled,

    /// Username/password pair not in the directory
    #[error("invalid username or password")]
    InvalidCredentials,
}
