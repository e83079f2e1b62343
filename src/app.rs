//! # App Composition
//!
//! The one place where the tracker, the calculator widget and the login
//! session are built and wired together. The deployment mode is read once,
//! here, and the tracker's limit is fixed from then on.

use crate::auth::{Directory, Session};
use crate::error::ConfigError;
use crate::shell::{LandingPage, Shell};
use crate::throttle::{DeploymentMode, RateWindowTracker, ThrottleConfig};
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::info;

/// Deployment mode (`dev`, `development`, `prod`, `production`).
pub const ENV_MODE: &str = "KALKULATOR_MODE";

/// Overrides the mode's event limit.
pub const ENV_MAX_EVENTS: &str = "KALKULATOR_MAX_EVENTS";

/// Overrides the window length in milliseconds.
pub const ENV_WINDOW_MS: &str = "KALKULATOR_WINDOW_MS";

/// Per-field overrides of the mode's throttle preset.
///
/// Unset fields follow whatever mode the config ends up with, so
/// `{"mode": "development"}` gets the development limit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleOverrides {
    /// Event limit per window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_events_per_window: Option<u32>,
    /// Window length in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_ms: Option<u64>,
    /// Reaper sweep interval in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_interval_ms: Option<u64>,
}

impl ThrottleOverrides {
    /// Applies the overrides on top of `mode`'s preset.
    pub fn resolve(&self, mode: DeploymentMode) -> ThrottleConfig {
        let preset = ThrottleConfig::for_mode(mode);

        ThrottleConfig {
            max_events_per_window: self
                .max_events_per_window
                .unwrap_or(preset.max_events_per_window),
            window_ms: self.window_ms.unwrap_or(preset.window_ms),
            sweep_interval_ms: self.sweep_interval_ms.unwrap_or(preset.sweep_interval_ms),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment mode
    pub mode: DeploymentMode,
    /// Explicit tracker settings; anything unset comes from `mode`
    pub throttle: ThrottleOverrides,
}

impl AppConfig {
    /// Preset for `mode`.
    pub fn for_mode(mode: DeploymentMode) -> Self {
        Self {
            mode,
            throttle: ThrottleOverrides::default(),
        }
    }

    /// Tracker settings: the mode preset with overrides applied.
    pub fn throttle_config(&self) -> ThrottleConfig {
        self.throttle.resolve(self.mode)
    }

    /// Loads configuration from environment variables.
    ///
    /// Unset variables keep the production preset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but unparsable, or the
    /// result fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup(ENV_MODE) {
            Some(val) => val.parse()?,
            None => DeploymentMode::default(),
        };
        let mut config = Self::for_mode(mode);

        if let Some(val) = lookup(ENV_MAX_EVENTS) {
            config.throttle.max_events_per_window = Some(parse_env(ENV_MAX_EVENTS, val)?);
        }

        if let Some(val) = lookup(ENV_WINDOW_MS) {
            config.throttle.window_ms = Some(parse_env(ENV_WINDOW_MS, val)?);
        }

        config.throttle_config().validate()?;
        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

/// The assembled application.
///
/// ```rust
/// use kalkulator::{App, AppConfig, DeploymentMode};
///
/// let mut app = App::new(AppConfig::for_mode(DeploymentMode::Development)).unwrap();
/// app.shell_mut().press_label("9").unwrap();
/// assert_eq!(app.shell().display(), "9");
/// assert_eq!(app.tracker().config().max_events_per_window, 10);
/// ```
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    tracker: Arc<RateWindowTracker>,
    shell: Shell,
    session: Session,
    landing: LandingPage,
}

impl App {
    /// Builds every component from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the throttle settings are invalid.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let throttle = config.throttle_config();
        let tracker = Arc::new(RateWindowTracker::new(throttle.clone())?);
        info!(
            "Assembled app in {} mode ({} events / {}ms)",
            config.mode, throttle.max_events_per_window, throttle.window_ms
        );

        Ok(Self {
            session: Session::new(Directory::new(), tracker.clone()),
            tracker,
            shell: Shell::new(),
            landing: LandingPage::new(),
            config,
        })
    }

    /// Builds the app from environment variables.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(AppConfig::from_env()?)
    }

    /// Settings the app was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared handle to the tracker.
    pub fn tracker(&self) -> Arc<RateWindowTracker> {
        self.tracker.clone()
    }

    /// Calculator widget.
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Calculator widget, mutably.
    pub fn shell_mut(&mut self) -> &mut Shell {
        &mut self.shell
    }

    /// Login session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Login session, mutably.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Landing page around the widget.
    pub fn render_landing(&self) -> String {
        self.landing.render(&self.shell)
    }

    /// Starts the background thread that drops expired tracker entries.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn start_reaper(&self) -> io::Result<(thread::JoinHandle<()>, mpsc::Sender<()>)> {
        self.tracker.clone().start_reaper_thread()
    }
}
