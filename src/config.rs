//! Client configuration parameters
//!
//! All tunable parameters for the monitoring client.
//! Values can be overridden from a JSON file passed to the replay binary.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Core client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    // --- Monitoring interval ---
    /// Smallest accepted update interval (seconds)
    pub min_interval_secs: u16,
    /// Largest accepted update interval (seconds)
    pub max_interval_secs: u16,
    /// Interval used when the request leaves the field blank (seconds)
    pub default_interval_secs: u16,

    // --- Export ---
    /// File name prefix for exported log files
    pub export_prefix: String,

    // --- Session behaviour ---
    /// Send a best-effort stop on teardown while monitoring is active
    pub stop_on_teardown: bool,
    /// Re-query session status after every (re)connect
    pub query_status_on_connect: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // Interval
            min_interval_secs: 10,
            max_interval_secs: 300,
            default_interval_secs: 30,

            // Export
            export_prefix: "busz_test_logs_".into(),

            // Session
            stop_on_teardown: true,
            query_status_on_connect: true,
        }
    }
}

impl ClientConfig {
    /// Reject configurations that would make the validator meaningless.
    /// Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("min_interval_secs must be > 0"));
        }
        if self.min_interval_secs > self.max_interval_secs {
            return Err(ConfigError::ValidationFailed(
                "min_interval_secs must not exceed max_interval_secs",
            ));
        }
        if !(self.min_interval_secs..=self.max_interval_secs).contains(&self.default_interval_secs)
        {
            return Err(ConfigError::ValidationFailed(
                "default_interval_secs must lie within the interval bounds",
            ));
        }
        if self.export_prefix.contains(['/', '\\']) {
            return Err(ConfigError::ValidationFailed(
                "export_prefix must not contain path separators",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors from loading or validating a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Document is not valid JSON for this schema.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
