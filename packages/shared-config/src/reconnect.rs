//! Reconnect backoff configuration

use std::time::Duration;

use crate::{parse_env, ConfigError, ConfigResult};

/// Backoff policy applied when the session link drops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt in milliseconds
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay in milliseconds
    pub max_delay_ms: u64,

    /// Growth factor between consecutive attempts (1 = fixed interval)
    pub multiplier: u32,

    /// Give up after this many consecutive failed attempts (`None` = never)
    pub max_attempts: Option<u32>,
}

impl ReconnectConfig {
    /// Load reconnect configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        let max_attempts: u32 = parse_env("JUKEBOX_RECONNECT_MAX_ATTEMPTS", 0)?;

        let config = Self {
            initial_delay_ms: parse_env("JUKEBOX_RECONNECT_INITIAL_MS", defaults.initial_delay_ms)?,
            max_delay_ms: parse_env("JUKEBOX_RECONNECT_MAX_MS", defaults.max_delay_ms)?,
            multiplier: parse_env("JUKEBOX_RECONNECT_MULTIPLIER", defaults.multiplier)?,
            max_attempts: (max_attempts > 0).then_some(max_attempts),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fixed-interval policy (useful for testing)
    pub fn fixed(delay: Duration) -> Self {
        let delay_ms = delay.as_millis() as u64;
        Self {
            initial_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            multiplier: 1,
            max_attempts: None,
        }
    }

    /// Limit the number of consecutive failed attempts
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Check the policy is internally consistent
    pub fn validate(&self) -> ConfigResult<()> {
        if self.multiplier == 0 {
            return Err(ConfigError::InvalidReconnect(
                "multiplier must be at least 1".to_string(),
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidReconnect(format!(
                "initial delay ({}ms) exceeds maximum ({}ms)",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }

    /// Delay before reconnect attempt `attempt` (0-based)
    ///
    /// Grows as `initial * multiplier^attempt`, capped at `max_delay_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.multiplier).saturating_pow(attempt);
        let delay_ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }

    /// Whether another attempt is allowed after `failed` consecutive failures
    pub fn allows_attempt(&self, failed: u32) -> bool {
        self.max_attempts.map_or(true, |max| failed < max)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 250,
            max_delay_ms: 10_000,
            multiplier: 2,
            max_attempts: None,
        }
    }
}
