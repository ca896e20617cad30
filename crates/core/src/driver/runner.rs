//! The synchronous retry loop.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::context::{ExecutionContext, FailureKind};
use super::error::RetryError;
use super::policy::RetryPolicy;
use super::watchdog::{AttemptGuard, Watched};
use crate::metrics;
use crate::sleeper::{Sleeper, ThreadSleeper};
use crate::task::{Attempt, Task};

/// Drives a task to completion on the calling thread.
///
/// The driver stands in for an asynchronous executor: it hands the task a
/// request snapshot, intercepts retry requests and overrun deadlines, sleeps
/// for the backoff, and invokes the task again until it succeeds, fails
/// fatally, or runs out of attempts.
///
/// A driver holds no per-run state and can be shared; each call to
/// [`RetryDriver::run`] owns a fresh [`ExecutionContext`].
#[derive(Clone)]
pub struct RetryDriver {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryDriver {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Replace the sleeper used for backoff delays.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `task` with `args` until it produces a value or the policy gives up.
    pub fn run<K, A>(&self, task: K, args: A) -> Result<K::Output, RetryError<K::Error>>
    where
        K: Task<A>,
        A: Send + Sync + 'static,
    {
        self.run_shared(Arc::new(task), Arc::new(args))
    }

    /// Same as [`RetryDriver::run`] for a task and arguments already behind `Arc`s.
    pub fn run_shared<K, A>(
        &self,
        task: Arc<K>,
        args: Arc<A>,
    ) -> Result<K::Output, RetryError<K::Error>>
    where
        K: Task<A>,
        A: Send + Sync + 'static,
    {
        let name = K::name(&task).to_string();
        let max_attempts = self.policy.max_attempts();
        let mut ctx: ExecutionContext<K::Error> = ExecutionContext::new(self.policy.max_retries);

        for attempt in 1..=max_attempts {
            let request = ctx.request();
            debug!(
                task = %name,
                attempt,
                retries = request.retries,
                "Starting attempt"
            );

            let started = Instant::now();
            let watched = match self.policy.time_limit {
                Some(limit) => match AttemptGuard::arm(&task, &args, request, limit) {
                    Ok(guard) => guard.wait(),
                    Err(e) => {
                        error!(task = %name, attempt, error = %e, "Failed to start attempt thread");
                        record_run(&name, "spawn_failed");
                        return Err(RetryError::Spawn(e));
                    }
                },
                None => Watched::Finished(K::run(&task, &request, &args)),
            };
            metrics::ATTEMPT_DURATION
                .with_label_values(&[name.as_str()])
                .observe(started.elapsed().as_secs_f64());

            match watched {
                Watched::Finished(Attempt::Success(value)) => {
                    record_attempt(&name, "success");
                    record_run(&name, "success");
                    if ctx.retries() > 0 {
                        info!(task = %name, attempt, "Task succeeded after retries");
                    } else {
                        debug!(task = %name, "Task succeeded on first attempt");
                    }
                    return Ok(value);
                }
                Watched::Finished(Attempt::Fatal(error)) => {
                    record_attempt(&name, "fatal");
                    record_run(&name, "fatal");
                    warn!(task = %name, attempt, "Task failed fatally, not retrying");
                    return Err(RetryError::Fatal(error));
                }
                Watched::Finished(Attempt::RetryRequested(cause)) => {
                    record_attempt(&name, "retry");
                    warn!(
                        task = %name,
                        attempt,
                        max_attempts,
                        has_cause = cause.is_some(),
                        "Task requested a retry"
                    );
                    ctx.record_retry(cause);
                }
                Watched::Overran => {
                    record_attempt(&name, "timeout");
                    warn!(
                        task = %name,
                        attempt,
                        max_attempts,
                        limit_ms = self.policy.time_limit.unwrap_or_default().as_millis() as u64,
                        "Attempt exceeded its time limit"
                    );
                    K::cancel(&task, &request);
                    ctx.record_timeout();
                }
            }

            // No point in waiting once the last attempt has failed.
            if attempt < max_attempts {
                let delay = self.policy.backoff.delay_for(ctx.retries());
                metrics::BACKOFF_DELAY.observe(delay.as_secs_f64());
                debug!(
                    task = %name,
                    retries = ctx.retries(),
                    delay_ms = delay.as_millis() as u64,
                    "Backing off before next attempt"
                );
                self.sleeper.sleep(delay);
            }
            ctx.advance();
        }

        let retries = ctx.retries();
        let err = match ctx.last_failure() {
            Some(FailureKind::TimedOut) => RetryError::TimedOut {
                limit: self.policy.time_limit.unwrap_or_default(),
                retries,
            },
            _ => RetryError::Exhausted {
                retries,
                cause: ctx.into_last_cause(),
            },
        };
        record_run(&name, err.label());
        error!(task = %name, retries, outcome = err.label(), "Giving up on task");
        Err(err)
    }
}

impl Default for RetryDriver {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl std::fmt::Debug for RetryDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryDriver")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Run `task` once under `policy`, retrying synchronously as it asks.
pub fn apply_with_retry<K, A>(
    task: K,
    args: A,
    policy: RetryPolicy,
) -> Result<K::Output, RetryError<K::Error>>
where
    K: Task<A>,
    A: Send + Sync + 'static,
{
    RetryDriver::new(policy).run(task, args)
}

fn record_attempt(task: &str, result: &str) {
    metrics::ATTEMPTS.with_label_values(&[task, result]).inc();
}

fn record_run(task: &str, outcome: &str) {
    metrics::RUNS.with_label_values(&[task, outcome]).inc();
}
