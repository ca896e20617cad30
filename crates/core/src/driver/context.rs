//! Per-run execution context owned by the driver.

use crate::task::TaskRequest;

/// Why the most recent attempt did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The task asked to be retried.
    RetryRequested,
    /// The attempt overran its time limit.
    TimedOut,
}

/// Mutable state of one driven run.
///
/// Created fresh for every call to the driver and never shared between runs.
#[derive(Debug)]
pub struct ExecutionContext<E> {
    request: TaskRequest,
    last_cause: Option<E>,
    last_failure: Option<FailureKind>,
}

impl<E> ExecutionContext<E> {
    pub fn new(max_retries: u32) -> Self {
        Self {
            request: TaskRequest::new(max_retries),
            last_cause: None,
            last_failure: None,
        }
    }

    /// Snapshot handed to the next invocation.
    pub fn request(&self) -> TaskRequest {
        self.request
    }

    pub fn retries(&self) -> u32 {
        self.request.retries
    }

    pub fn last_cause(&self) -> Option<&E> {
        self.last_cause.as_ref()
    }

    pub fn last_failure(&self) -> Option<FailureKind> {
        self.last_failure
    }

    /// Note a retry request; an absent cause keeps the previously recorded one.
    pub fn record_retry(&mut self, cause: Option<E>) {
        if cause.is_some() {
            self.last_cause = cause;
        }
        self.last_failure = Some(FailureKind::RetryRequested);
    }

    /// Note an attempt that overran its deadline.
    pub fn record_timeout(&mut self) {
        self.last_failure = Some(FailureKind::TimedOut);
    }

    /// Count the intercepted signal. Called once per failed attempt.
    pub fn advance(&mut self) {
        self.request.retries = self.request.retries.saturating_add(1);
    }

    pub fn into_last_cause(self) -> Option<E> {
        self.last_cause
    }
}
