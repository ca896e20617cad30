//! Core task data types.

use serde::Serialize;

// ============================================================================
// Attempt Result
// ============================================================================

/// What a single invocation of a task produced.
///
/// Asking for a retry is a value, not an unwinding error: the driver inspects
/// the variant and decides whether to back off and invoke the task again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T, E> {
    /// The task completed; no further attempts are made.
    Success(T),
    /// The task wants to be invoked again later, optionally explaining why.
    RetryRequested(Option<E>),
    /// The task failed in a way that must not be retried.
    Fatal(E),
}

impl<T, E> Attempt<T, E> {
    /// Request a retry, recording `cause` as the reason.
    pub fn retry(cause: E) -> Self {
        Self::RetryRequested(Some(cause))
    }

    /// Request a retry without a recorded cause.
    pub fn retry_later() -> Self {
        Self::RetryRequested(None)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Self::RetryRequested(_))
    }

    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::RetryRequested(_) => "retry",
            Self::Fatal(_) => "fatal",
        }
    }
}

impl<T, E> From<Result<T, E>> for Attempt<T, E> {
    /// `Ok` maps to success and `Err` to a fatal failure.
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Fatal(error),
        }
    }
}

// ============================================================================
// Task Request
// ============================================================================

/// Read-only view of the execution context handed to every invocation.
///
/// The driver owns the mutable context; tasks only ever see a snapshot whose
/// `retries` never decreases between invocations of the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskRequest {
    /// Retries intercepted so far in this run (0 on the first invocation).
    pub retries: u32,
    /// Maximum number of retries the driver will grant.
    pub max_retries: u32,
}

impl TaskRequest {
    pub(crate) fn new(max_retries: u32) -> Self {
        Self {
            retries: 0,
            max_retries,
        }
    }

    /// 1-based number of the current invocation.
    pub fn attempt(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Whether a retry request from this invocation would exhaust the run.
    pub fn is_last_attempt(&self) -> bool {
        self.retries >= self.max_retries
    }

    /// Retries still available after this invocation.
    pub fn remaining_retries(&self) -> u32 {
        self.max_retries.saturating_sub(self.retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_constructors() {
        let with_cause: Attempt<(), &str> = Attempt::retry("rate limited");
        assert_eq!(with_cause, Attempt::RetryRequested(Some("rate limited")));

        let without: Attempt<(), &str> = Attempt::retry_later();
        assert_eq!(without, Attempt::RetryRequested(None));
        assert!(without.is_retry());
    }

    #[test]
    fn test_from_result() {
        let ok: Attempt<u32, String> = Ok(7).into();
        assert_eq!(ok, Attempt::Success(7));

        let err: Attempt<u32, String> = Err("boom".to_string()).into();
        assert_eq!(err, Attempt::Fatal("boom".to_string()));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Attempt::<(), ()>::Success(()).label(), "success");
        assert_eq!(Attempt::<(), ()>::retry_later().label(), "retry");
        assert_eq!(Attempt::<(), ()>::Fatal(()).label(), "fatal");
    }

    #[test]
    fn test_request_bookkeeping() {
        let mut request = TaskRequest::new(2);
        assert_eq!(request.attempt(), 1);
        assert_eq!(request.remaining_retries(), 2);
        assert!(!request.is_last_attempt());

        request.retries = 2;
        assert_eq!(request.attempt(), 3);
        assert_eq!(request.remaining_retries(), 0);
        assert!(request.is_last_attempt());
    }

    #[test]
    fn test_request_with_zero_retries_is_last_attempt() {
        assert!(TaskRequest::new(0).is_last_attempt());
    }
}
