//! Core error types for eggsacto-core.
//!
//! The countdown itself has no failure paths; errors only come from
//! configuration handling and from parsing user-supplied durations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for eggsacto-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be created
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Clock string not in `m:ss` form
    #[error("Invalid clock string '{input}': expected m:ss")]
    MalformedClock { input: String },

    /// Seconds component of a clock string outside 0..=59
    #[error("Seconds out of range in '{input}': must be 00-59")]
    SecondsOutOfRange { input: String },

    /// Unknown preset name
    #[error("Unknown preset '{0}': expected one of 1, 2, 5, 12")]
    UnknownPreset(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_core_error() {
        let err: CoreError = ConfigError::UnknownKey("ruler.nope".into()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown configuration key: ruler.nope"
        );
    }

    #[test]
    fn validation_error_message_names_input() {
        let err = ValidationError::MalformedClock { input: "abc".into() };
        assert!(err.to_string().contains("'abc'"));
    }
}
