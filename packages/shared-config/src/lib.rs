//! Shared configuration types for Jukebox session clients
//!
//! This crate provides the configuration used by every front-end that joins
//! a live session: where the session server lives, how the realtime link
//! reconnects, and which participant role the client was started with.

mod error;
mod reconnect;
mod server;

pub use error::{ConfigError, ConfigResult};
pub use reconnect::ReconnectConfig;
pub use server::ServerConfig;

use std::env;

/// Configuration shared by all session clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Session server configuration
    pub server: ServerConfig,

    /// Reconnect backoff policy
    pub reconnect: ReconnectConfig,

    /// Participant role hint (`host`, `peer` or `none`); when unset the
    /// client asks the server
    pub context: Option<String>,

    /// Environment mode (development, staging, production)
    pub environment: Environment,

    /// Log level (from RUST_LOG or LOG_LEVEL)
    pub log_level: String,
}

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl ClientConfig {
    /// Load client configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            server: ServerConfig::from_env()?,
            reconnect: ReconnectConfig::from_env()?,
            context: env::var("JUKEBOX_CONTEXT").ok().filter(|s| !s.trim().is_empty()),
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse()
                .unwrap_or_default(),
            log_level: env::var("RUST_LOG")
                .or_else(|_| env::var("LOG_LEVEL"))
                .unwrap_or_else(|_| "info".to_string()),
        };

        if config.environment.is_production() && config.server.base_url.scheme() != "https" {
            return Err(ConfigError::NotAllowed {
                setting: "JUKEBOX_SERVER_URL",
                environment: config.environment.to_string(),
                reason: "the session server must be reached over https",
            });
        }

        Ok(config)
    }

}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                var: name.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}
