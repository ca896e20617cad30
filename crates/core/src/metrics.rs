//! Prometheus metrics for retry runs.
//!
//! This module provides metrics for:
//! - Individual attempts (by task and result)
//! - Whole runs (by task and final outcome)
//! - Backoff delays and abandoned watchdog threads

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Attempt Metrics
// =============================================================================

/// Attempts total by task and result.
pub static ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("syncretry_attempts_total", "Total task attempts"),
        &["task", "result"], // "success", "retry", "timeout", "fatal"
    )
    .unwrap()
});

/// Attempt duration in seconds.
pub static ATTEMPT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "syncretry_attempt_duration_seconds",
            "Duration of a single task attempt",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 60.0, 300.0, 3600.0]),
        &["task"],
    )
    .unwrap()
});

/// Attempt threads abandoned after their deadline elapsed.
pub static ABANDONED_ATTEMPTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "syncretry_abandoned_attempts_total",
        "Total attempt threads abandoned after a timeout",
    )
    .unwrap()
});

// =============================================================================
// Run Metrics
// =============================================================================

/// Runs total by task and outcome.
pub static RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("syncretry_runs_total", "Total driven runs"),
        &["task", "outcome"], // "success", "exhausted", "timed_out", "fatal"
    )
    .unwrap()
});

/// Backoff delays slept between attempts.
pub static BACKOFF_DELAY: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("syncretry_backoff_seconds", "Backoff delay between attempts")
            .buckets(vec![0.0, 0.1, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0, 3600.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(ATTEMPTS.clone()),
        Box::new(ATTEMPT_DURATION.clone()),
        Box::new(ABANDONED_ATTEMPTS.clone()),
        Box::new(RUNS.clone()),
        Box::new(BACKOFF_DELAY.clone()),
    ]
}

/// Register all metrics with `registry`.
pub fn register_all(registry: &prometheus::Registry) -> prometheus::Result<()> {
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}
