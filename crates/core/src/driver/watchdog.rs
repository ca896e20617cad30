//! Preemptive deadline for a single attempt.
//!
//! Tasks are not assumed to check for cancellation, so a timed attempt runs
//! on its own thread while the driver waits on a channel with a deadline. An
//! attempt that overruns is abandoned in place: its thread keeps running
//! until the task returns, and whatever it produces is discarded. The driver
//! then calls [`Task::cancel`] so tasks that can stop their work do so.

use std::panic;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use crate::metrics;
use crate::task::{Attempt, Task, TaskRequest};

/// Result of waiting on a guarded attempt.
#[derive(Debug)]
pub(crate) enum Watched<T, E> {
    Finished(Attempt<T, E>),
    Overran,
}

/// Scope of one armed deadline.
///
/// Every exit path consumes or drops the guard, so a deadline can never leak
/// into a later attempt. Dropping a guard whose thread is still running
/// abandons that thread.
pub(crate) struct AttemptGuard<T, E> {
    receiver: mpsc::Receiver<Attempt<T, E>>,
    handle: Option<JoinHandle<()>>,
    limit: Duration,
    task_name: String,
    attempt: u32,
}

impl<T, E> AttemptGuard<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Start `task` on a supervised thread.
    pub(crate) fn arm<K, A>(
        task: &Arc<K>,
        args: &Arc<A>,
        request: TaskRequest,
        limit: Duration,
    ) -> std::io::Result<Self>
    where
        K: Task<A, Output = T, Error = E>,
        A: Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        let task_name = K::name(task).to_string();
        let task = Arc::clone(task);
        let args = Arc::clone(args);

        let handle = thread::Builder::new()
            .name(format!("syncretry-attempt-{}", request.attempt()))
            .spawn(move || {
                let attempt = K::run(&task, &request, &args);
                // The receiver is gone once the deadline has passed.
                let _ = sender.send(attempt);
            })?;

        Ok(Self {
            receiver,
            handle: Some(handle),
            limit,
            task_name,
            attempt: request.attempt(),
        })
    }

    /// Block until the attempt finishes or its deadline passes.
    ///
    /// A panic inside the task is resumed on the calling thread.
    pub(crate) fn wait(mut self) -> Watched<T, E> {
        match self.receiver.recv_timeout(self.limit) {
            Ok(attempt) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                Watched::Finished(attempt)
            }
            Err(RecvTimeoutError::Timeout) => Watched::Overran,
            Err(RecvTimeoutError::Disconnected) => {
                // The sender only goes away without sending when the task panicked.
                if let Some(handle) = self.handle.take() {
                    if let Err(payload) = handle.join() {
                        panic::resume_unwind(payload);
                    }
                }
                Watched::Overran
            }
        }
    }
}

impl<T, E> Drop for AttemptGuard<T, E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                metrics::ABANDONED_ATTEMPTS.inc();
                warn!(
                    task = %self.task_name,
                    attempt = self.attempt,
                    limit_ms = self.limit.as_millis() as u64,
                    "Abandoning attempt thread still running past its deadline"
                );
            }
        }
    }
}
