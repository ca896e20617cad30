use super::{
    types::{BackoffConfig, Config},
    ConfigError,
};

/// Upper bound on configured retries.
const MAX_RETRIES_LIMIT: u32 = 1000;

/// Validate configuration
/// Currently validates:
/// - max_retries is at most 1000
/// - backoff delays are finite and non-negative, multiplier is at least 1
/// - time_limit_secs, when set, is finite and positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let retry = &config.retry;

    if retry.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::ValidationError(format!(
            "retry.max_retries cannot exceed {}",
            MAX_RETRIES_LIMIT
        )));
    }

    match &retry.backoff {
        BackoffConfig::Fixed { delay_secs } => {
            check_delay("retry.backoff.delay_secs", *delay_secs)?;
        }
        BackoffConfig::Exponential {
            base_secs,
            multiplier,
            max_secs,
        } => {
            check_delay("retry.backoff.base_secs", *base_secs)?;
            check_delay("retry.backoff.max_secs", *max_secs)?;
            if !multiplier.is_finite() || *multiplier < 1.0 {
                return Err(ConfigError::ValidationError(
                    "retry.backoff.multiplier must be a finite number >= 1".to_string(),
                ));
            }
        }
    }

    if let Some(limit) = retry.time_limit_secs {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(ConfigError::ValidationError(
                "retry.time_limit_secs must be a finite number > 0".to_string(),
            ));
        }
    }

    Ok(())
}

fn check_delay(field: &str, secs: f64) -> Result<(), ConfigError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{} must be a finite number >= 0",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, RetryConfig};

    fn config_with(retry: RetryConfig) -> Config {
        Config {
            retry,
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_too_many_retries_fails() {
        let config = config_with(RetryConfig {
            max_retries: 5000,
            ..RetryConfig::default()
        });
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_negative_delay_fails() {
        let config = config_with(RetryConfig {
            backoff: BackoffConfig::Fixed { delay_secs: -1.0 },
            ..RetryConfig::default()
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_nan_base_fails() {
        let config = config_with(RetryConfig {
            backoff: BackoffConfig::Exponential {
                base_secs: f64::NAN,
                multiplier: 2.0,
                max_secs: 10.0,
            },
            ..RetryConfig::default()
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_shrinking_multiplier_fails() {
        let config = config_with(RetryConfig {
            backoff: BackoffConfig::Exponential {
                base_secs: 1.0,
                multiplier: 0.5,
                max_secs: 10.0,
            },
            ..RetryConfig::default()
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("multiplier"));
    }

    #[test]
    fn test_validate_zero_time_limit_fails() {
        let config = config_with(RetryConfig {
            time_limit_secs: Some(0.0),
            ..RetryConfig::default()
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("time_limit_secs"));
    }

    #[test]
    fn test_validate_zero_delay_is_allowed() {
        let config = config_with(RetryConfig {
            max_retries: 0,
            backoff: BackoffConfig::Fixed { delay_secs: 0.0 },
            time_limit_secs: Some(1.0),
        });
        assert!(validate_config(&config).is_ok());
    }
}
