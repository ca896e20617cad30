//! Retry policy for a driver.

use std::time::Duration;

use crate::backoff::Backoff;
use crate::config::{BackoffConfig, ConfigError, RetryConfig};

/// How many times to retry, how long to wait in between, and how long a
/// single attempt may run.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries granted after the first attempt; at most `max_retries + 1`
    /// invocations happen.
    pub max_retries: u32,
    /// Delay between a failed attempt and the next one. There is no trailing
    /// sleep after the final failed attempt.
    pub backoff: Backoff,
    /// Hard limit for each single attempt.
    pub time_limit: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Backoff::default(),
            time_limit: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Sets the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff.
    pub fn with_backoff(mut self, backoff: impl Into<Backoff>) -> Self {
        self.backoff = backoff.into();
        self
    }

    /// Sets the per-attempt time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Removes the per-attempt time limit.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit = None;
        self
    }

    /// Total invocations the policy allows.
    pub fn max_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = ConfigError;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        let backoff = match &config.backoff {
            BackoffConfig::Fixed { delay_secs } => {
                Backoff::Fixed(secs("retry.backoff.delay_secs", *delay_secs)?)
            }
            BackoffConfig::Exponential {
                base_secs,
                multiplier,
                max_secs,
            } => Backoff::exponential(
                secs("retry.backoff.base_secs", *base_secs)?,
                *multiplier,
                secs("retry.backoff.max_secs", *max_secs)?,
            ),
        };

        let time_limit = match config.time_limit_secs {
            Some(limit) if limit <= 0.0 => {
                return Err(ConfigError::ValidationError(
                    "retry.time_limit_secs must be > 0".to_string(),
                ))
            }
            Some(limit) => Some(secs("retry.time_limit_secs", limit)?),
            None => None,
        };

        Ok(Self {
            max_retries: config.max_retries,
            backoff,
            time_limit,
        })
    }
}

fn secs(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| ConfigError::ValidationError(format!("{}: {}", field, e)))
}
