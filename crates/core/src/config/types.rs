use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Retry policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries granted after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay between attempts.
    #[serde(default)]
    pub backoff: BackoffConfig,
    /// Hard limit for each single attempt, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<f64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff: BackoffConfig::default(),
            time_limit_secs: None,
        }
    }
}

fn default_max_retries() -> u32 {
    5
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffConfig {
    /// Same delay before every retry.
    Fixed {
        #[serde(default = "default_delay_secs")]
        delay_secs: f64,
    },
    /// `base_secs * multiplier^retries`, capped at `max_secs`.
    Exponential {
        #[serde(default = "default_base_secs")]
        base_secs: f64,
        #[serde(default = "default_multiplier")]
        multiplier: f64,
        #[serde(default = "default_max_secs")]
        max_secs: f64,
    },
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::Fixed {
            delay_secs: default_delay_secs(),
        }
    }
}

fn default_delay_secs() -> f64 {
    10.0
}

fn default_base_secs() -> f64 {
    2.0
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_secs() -> f64 {
    3600.0 // 1 hour
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}
