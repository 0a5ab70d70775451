//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `hkmirror.toml` in the working directory (or the file named by
//! `HKMIRROR_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use hkmirror_domain::characteristic::CharacteristicCategory;
use serde::Deserialize;

const DEFAULT_PATH: &str = "hkmirror.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub home: HomeConfig,
    pub simulation: SimulationConfig,
    pub subscriptions: SubscriptionsConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// The demo home served by the virtual source.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    pub name: String,
}

/// Random value changes injected into the virtual home.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    /// Delay between two changes, in milliseconds.
    pub interval_ms: u64,
}

/// What the daemon listens to.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SubscriptionsConfig {
    /// Characteristic categories watched on every service
    /// (snake case, e.g. `power_state`).
    pub categories: Vec<CharacteristicCategory>,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HKMIRROR_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HKMIRROR_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("HKMIRROR_HOME_NAME") {
            self.home.name = val;
        }
        if let Some(interval) = var("HKMIRROR_SIMULATION_INTERVAL_MS").and_then(|v| v.parse().ok())
        {
            self.simulation.interval_ms = interval;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.home.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "home name must not be empty".to_string(),
            ));
        }
        if self.simulation.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "simulation interval must be non-zero".to_string(),
            ));
        }
        if self.subscriptions.categories.is_empty() {
            return Err(ConfigError::Validation(
                "at least one characteristic category must be watched".to_string(),
            ));
        }
        Ok(())
    }

    /// Simulation period.
    #[must_use]
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.simulation.interval_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hkmirrord=info,hkmirror_app=info,hkmirror_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            name: hkmirror_adapter_virtual::previews::HOME_NAME.to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 2_000,
        }
    }
}

impl Default for SubscriptionsConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                CharacteristicCategory::PowerState,
                CharacteristicCategory::ContactState,
                CharacteristicCategory::MotionDetected,
                CharacteristicCategory::CurrentSecuritySystemState,
            ],
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
