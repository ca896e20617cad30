use std::path::PathBuf;

use clap::Parser;
use syncretry_core::{BackoffConfig, Config};

/// Exit status a command uses to ask for a retry (EX_TEMPFAIL).
pub const DEFAULT_RETRY_EXIT_CODE: i32 = 75;

#[derive(Debug, Parser)]
#[command(
    name = "syncretry",
    author,
    version,
    about = "Run a command to completion, retrying whenever it asks to be retried"
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "SYNCRETRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Retries granted after the first attempt
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Fixed delay between attempts, in seconds
    #[arg(long)]
    pub backoff_secs: Option<f64>,

    /// Hard limit for each single attempt, in seconds
    #[arg(long)]
    pub time_limit_secs: Option<f64>,

    /// Exit status that requests a retry (repeatable)
    #[arg(
        long = "retry-exit-code",
        value_name = "CODE",
        default_values_t = [DEFAULT_RETRY_EXIT_CODE]
    )]
    pub retry_exit_codes: Vec<i32>,

    /// Print a JSON run report instead of forwarding the command's output
    #[arg(long)]
    pub json: bool,

    /// Dump prometheus metrics to stderr on exit
    #[arg(long)]
    pub print_metrics: bool,

    /// Command to run, followed by its arguments
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if let Some(delay_secs) = self.backoff_secs {
            config.retry.backoff = BackoffConfig::Fixed { delay_secs };
        }
        if let Some(limit) = self.time_limit_secs {
            config.retry.time_limit_secs = Some(limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["syncretry", "--", "curl", "-sf", "http://localhost"])
            .unwrap();
        assert_eq!(cli.command, vec!["curl", "-sf", "http://localhost"]);
        assert_eq!(cli.retry_exit_codes, vec![DEFAULT_RETRY_EXIT_CODE]);
        assert!(cli.config.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::try_parse_from([
            "syncretry",
            "--max-retries",
            "3",
            "--backoff-secs",
            "0.5",
            "--time-limit-secs",
            "60",
            "--retry-exit-code",
            "75",
            "--retry-exit-code",
            "111",
            "--json",
            "--print-metrics",
            "--",
            "sh",
            "-c",
            "exit 0",
        ])
        .unwrap();
        assert_eq!(cli.max_retries, Some(3));
        assert_eq!(cli.backoff_secs, Some(0.5));
        assert_eq!(cli.time_limit_secs, Some(60.0));
        assert_eq!(cli.retry_exit_codes, vec![75, 111]);
        assert!(cli.json);
        assert!(cli.print_metrics);
        assert_eq!(cli.command, vec!["sh", "-c", "exit 0"]);
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["syncretry"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from([
            "syncretry",
            "--max-retries",
            "1",
            "--backoff-secs",
            "2",
            "--time-limit-secs",
            "5",
            "--",
            "true",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.backoff, BackoffConfig::Fixed { delay_secs: 2.0 });
        assert_eq!(config.retry.time_limit_secs, Some(5.0));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::try_parse_from(["syncretry", "--", "true"]).unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.retry.max_retries, 5);
        assert!(config.retry.time_limit_secs.is_none());
    }
}
