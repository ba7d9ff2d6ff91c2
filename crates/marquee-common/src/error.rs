//! Error types shared across the Marquee crates

use thiserror::Error;

/// Result type alias for Marquee operations
pub type Result<T> = std::result::Result<T, MarqueeError>;

/// Main error type for Marquee
#[derive(Error, Debug)]
pub enum MarqueeError {
    /// An environment variable was set but could not be parsed
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarqueeError {
    pub fn invalid_setting(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Read `key` from the environment and parse it, falling back to `default`
/// when the variable is unset or empty.
///
/// A variable that is present but unparseable is an error rather than a
/// silent fallback.
pub fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| MarqueeError::invalid_setting(key, raw.clone(), e)),
        _ => Ok(default),
    }
}
