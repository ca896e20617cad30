//! Error types for the retry driver.

use std::time::Duration;
use thiserror::Error;

/// Ways a driven run can end without a value.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt asked for a retry; carries the last recorded cause.
    #[error("retries exhausted after {retries} retries")]
    Exhausted { retries: u32, cause: Option<E> },

    /// The final attempt overran its time limit.
    #[error("attempt timed out after {limit:?} ({retries} retries)")]
    TimedOut { limit: Duration, retries: u32 },

    /// The task failed fatally; never retried.
    #[error("task failed: {0}")]
    Fatal(E),

    /// The watchdog could not start a thread for a timed attempt.
    #[error("failed to spawn attempt thread: {0}")]
    Spawn(std::io::Error),

    /// The blocking pool dropped the run before it finished.
    #[error("retry run aborted before completion")]
    Aborted,
}

impl<E> RetryError<E> {
    /// The task-supplied error behind this failure, if any.
    pub fn cause(&self) -> Option<&E> {
        match self {
            Self::Exhausted { cause, .. } => cause.as_ref(),
            Self::Fatal(error) => Some(error),
            _ => None,
        }
    }

    /// Consume the error and return the task-supplied error, if any.
    pub fn into_cause(self) -> Option<E> {
        match self {
            Self::Exhausted { cause, .. } => cause,
            Self::Fatal(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exhausted { .. } => "exhausted",
            Self::TimedOut { .. } => "timed_out",
            Self::Fatal(_) => "fatal",
            Self::Spawn(_) => "spawn_failed",
            Self::Aborted => "aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_keeps_cause() {
        let err: RetryError<String> = RetryError::Exhausted {
            retries: 2,
            cause: Some("rate limited".to_string()),
        };
        assert!(err.is_exhausted());
        assert_eq!(err.cause().map(String::as_str), Some("rate limited"));
        assert_eq!(err.to_string(), "retries exhausted after 2 retries");
        assert_eq!(err.into_cause(), Some("rate limited".to_string()));
    }

    #[test]
    fn test_timed_out_has_no_cause() {
        let err: RetryError<String> = RetryError::TimedOut {
            limit: Duration::from_secs(1),
            retries: 1,
        };
        assert!(err.is_timed_out());
        assert!(err.cause().is_none());
        assert_eq!(err.label(), "timed_out");
    }

    #[test]
    fn test_fatal_display() {
        let err: RetryError<String> = RetryError::Fatal("bad input".to_string());
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "task failed: bad input");
    }
}
