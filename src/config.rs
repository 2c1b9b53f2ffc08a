//! Configuration management for session-gate.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (`SESSION_GATE_*`)
//! 2. Configuration file (JSON)
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::provider::LockoutPolicy;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity provider connection settings.
    pub provider: ProviderSection,
    /// Authentication policy settings.
    pub policy: PolicySection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Identity provider connection section.
///
/// The keys a hosted identity backend hands out with a project; all strings,
/// sourced from the environment in deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// API key for the provider project.
    pub api_key: String,
    /// Domain handling the auth flows.
    pub auth_domain: String,
    /// Provider project identifier.
    pub project_id: String,
    /// Application identifier within the project.
    pub app_id: String,
    /// Analytics measurement ID, where the project has one.
    pub measurement_id: Option<String>,
}

impl ProviderSection {
    /// Check that the fields a live provider needs are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("provider.api_key", &self.api_key),
            ("provider.project_id", &self.project_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(field));
            }
        }
        Ok(())
    }
}

/// Authentication policy section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    /// Enable the failed-login lockout.
    pub lockout_enabled: bool,
    /// Failures tolerated per window.
    pub lockout_max_failures: u32,
    /// Window size in seconds.
    pub lockout_window_secs: u64,
}

impl Default for PolicySection {
    fn default() -> Self {
        let policy = LockoutPolicy::default();
        Self {
            lockout_enabled: policy.enabled,
            lockout_max_failures: policy.max_failures,
            lockout_window_secs: policy.window.as_secs(),
        }
    }
}

impl PolicySection {
    /// Convert to the provider-facing policy type.
    pub fn to_lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_failures: self.lockout_max_failures,
            window: std::time::Duration::from_secs(self.lockout_window_secs),
            enabled: self.lockout_enabled,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("SESSION_GATE_API_KEY") {
            if !key.is_empty() {
                self.provider.api_key = key;
            }
        }

        if let Ok(domain) = std::env::var("SESSION_GATE_AUTH_DOMAIN") {
            self.provider.auth_domain = domain;
        }

        if let Ok(project) = std::env::var("SESSION_GATE_PROJECT_ID") {
            self.provider.project_id = project;
        }

        if let Ok(level) = std::env::var("SESSION_GATE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Load configuration with the full priority chain.
    ///
    /// Priority: env vars > config file > defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();

        Ok(config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A required field is missing or empty.
    MissingField(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::MissingField(field) => write!(f, "missing required config field: {}", field),
        }
    }
}

impl std::error::Error for ConfigError {}
