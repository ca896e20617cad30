//! Final report of a run and the process exit status it maps to.

use serde::Serialize;

use syncretry_core::RetryError;

use crate::command::{CommandError, CommandOutput};

/// Exit status when every attempt asked for a retry (EX_TEMPFAIL).
pub const EXIT_EXHAUSTED: i32 = 75;
/// Exit status when the final attempt overran its time limit.
pub const EXIT_TIMED_OUT: i32 = 124;
/// Exit status for any other failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Exhausted,
    TimedOut,
    Fatal,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub attempts: u32,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
}

impl RunReport {
    pub fn new(result: &Result<CommandOutput, RetryError<CommandError>>, attempts: u32) -> Self {
        match result {
            Ok(output) => Self {
                status: RunStatus::Success,
                attempts,
                exit_code: 0,
                message: None,
                stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            },
            Err(err) => {
                let (status, exit_code) = match err {
                    RetryError::Exhausted { .. } => (RunStatus::Exhausted, EXIT_EXHAUSTED),
                    RetryError::TimedOut { .. } => (RunStatus::TimedOut, EXIT_TIMED_OUT),
                    RetryError::Fatal(cause) => (
                        RunStatus::Fatal,
                        cause.exit_code().unwrap_or(EXIT_FAILURE),
                    ),
                    RetryError::Spawn(_) | RetryError::Aborted => (RunStatus::Fatal, EXIT_FAILURE),
                };
                Self {
                    status,
                    attempts,
                    exit_code,
                    message: Some(describe(err)),
                    stdout: None,
                }
            }
        }
    }
}

fn describe(err: &RetryError<CommandError>) -> String {
    match err.cause() {
        Some(cause) if !err.is_fatal() => format!("{}: last cause: {}", err, cause),
        _ => err.to_string(),
    }
}
