//! Configuration error types

use thiserror::Error;

/// Why a client configuration could not be built
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable is set but cannot be parsed
    #[error("{var} has an invalid value: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Session server origin is not an http(s) URL
    #[error("{var} is not a usable server origin: {reason}")]
    InvalidServerUrl { var: String, reason: String },

    /// Reconnect backoff settings contradict each other
    #[error("invalid reconnect policy: {0}")]
    InvalidReconnect(String),

    /// Setting not allowed in the selected environment
    #[error("{setting} is not allowed in {environment}: {reason}")]
    NotAllowed {
        setting: &'static str,
        environment: String,
        reason: &'static str,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_the_variable() {
        let err = ConfigError::InvalidValue {
            var: "JUKEBOX_REQUEST_TIMEOUT".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "JUKEBOX_REQUEST_TIMEOUT has an invalid value: invalid digit found in string"
        );
    }
}
