mod args;
mod command;
mod logging;
mod report;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use syncretry_core::{
    load_config, load_config_from_env, metrics, validate_config, RetryDriver, RetryPolicy,
};

use args::Cli;
use command::{CommandSpec, CommandTask};
use report::{RunReport, EXIT_FAILURE};

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("syncretry: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    // Load configuration
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => load_config_from_env().context("Failed to load config from environment")?,
    };
    cli.apply_overrides(&mut config);

    // Initialize logging
    logging::init(&config.logging)?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    let policy = RetryPolicy::try_from(&config.retry).context("Invalid retry policy")?;
    info!(
        max_retries = policy.max_retries,
        backoff = ?policy.backoff,
        time_limit = ?policy.time_limit,
        "Retry policy loaded"
    );

    let registry = prometheus::Registry::new();
    metrics::register_all(&registry).context("Failed to register metrics")?;

    let spec = CommandSpec::from_argv(&cli.command).context("No command given")?;
    let task = Arc::new(CommandTask::new(cli.retry_exit_codes.clone()));
    let driver = RetryDriver::new(policy);

    info!(program = %spec.program, "Running command");
    let result = driver.run_shared(Arc::clone(&task), Arc::new(spec));
    let report = RunReport::new(&result, task.attempts());

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        match &result {
            Ok(output) => {
                use std::io::Write;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&output.stdout).context("Failed to write output")?;
                stdout.flush().context("Failed to flush output")?;
                let mut stderr = std::io::stderr().lock();
                stderr.write_all(&output.stderr).context("Failed to write output")?;
            }
            Err(err) => {
                if let Some(stderr) = err.cause().and_then(|cause| cause.stderr()) {
                    eprintln!("{}", stderr);
                }
                if let Some(message) = &report.message {
                    eprintln!("syncretry: {}", message);
                }
            }
        }
    }

    if cli.print_metrics {
        let encoder = prometheus::TextEncoder::new();
        match encoder.encode_to_string(&registry.gather()) {
            Ok(text) => eprint!("{}", text),
            Err(e) => warn!(error = %e, "Failed to encode metrics"),
        }
    }

    info!(
        status = ?report.status,
        attempts = report.attempts,
        exit_code = report.exit_code,
        "Run finished"
    );
    Ok(report.exit_code)
}
