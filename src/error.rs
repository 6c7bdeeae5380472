//! Simulation error types.
//!
//! Configuration is validated before a round starts; launches are refused
//! while a flight is in progress. Everything else in the core is recoverable
//! by construction and does not produce an error.

use std::fmt;

/// Top-level error enum for the bounce simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A configuration value is outside its valid range.
    /// The round is not started.
    InvalidConfiguration {
        /// Name of the setting (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the valid range.
        valid_range: &'static str,
    },

    /// Settings JSON could not be deserialized.
    ConfigParse(String),

    /// A launch was requested while the ball is still in flight.
    NotIdle,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidConfiguration {
                name,
                value,
                valid_range,
            } => write!(
                f,
                "setting '{}' = {} is outside valid range {}",
                name, value, valid_range
            ),
            SimError::ConfigParse(msg) => write!(f, "could not parse settings: {}", msg),
            SimError::NotIdle => write!(f, "cannot launch while the ball is in flight"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::ConfigParse(err.to_string())
    }
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
