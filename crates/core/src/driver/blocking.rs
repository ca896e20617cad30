//! Awaiting a synchronous run from async code.

use std::panic;

use super::error::RetryError;
use super::runner::RetryDriver;
use crate::task::Task;

impl RetryDriver {
    /// Drive `task` on tokio's blocking pool and await the final result.
    ///
    /// Backoff sleeps and attempts block a pool thread, never a runtime
    /// worker. Panics inside the task are resumed in the awaiting task.
    pub async fn run_blocking<K, A>(
        &self,
        task: K,
        args: A,
    ) -> Result<K::Output, RetryError<K::Error>>
    where
        K: Task<A>,
        A: Send + Sync + 'static,
    {
        let driver = self.clone();
        match tokio::task::spawn_blocking(move || driver.run(task, args)).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => panic::resume_unwind(e.into_panic()),
            Err(_) => Err(RetryError::Aborted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RetryPolicy;
    use crate::task::{Attempt, TaskRequest};
    use crate::testing::{ScriptedTask, Step};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_blocking_success_after_retry() {
        let driver = RetryDriver::new(RetryPolicy::new(2).with_backoff(Duration::from_millis(5)));
        let task: ScriptedTask<&str, String> =
            ScriptedTask::new(vec![Step::retry_later(), Step::Succeed("ok")]);

        let value = driver.run_blocking(task.clone(), ()).await.unwrap();
        assert_eq!(value, "ok");
        assert_eq!(task.invocation_count(), 2);
    }

    #[tokio::test]
    async fn test_run_blocking_surfaces_fatal() {
        let driver = RetryDriver::new(RetryPolicy::new(2));
        let result = driver
            .run_blocking(
                |_: &TaskRequest, _: &()| -> Attempt<(), String> { Attempt::Fatal("nope".into()) },
                (),
            )
            .await;
        assert!(matches!(result, Err(RetryError::Fatal(ref e)) if e == "nope"));
    }

    #[tokio::test]
    #[should_panic(expected = "pool panic")]
    async fn test_run_blocking_resumes_panic() {
        let driver = RetryDriver::new(RetryPolicy::new(0));
        let _ = driver
            .run_blocking(
                |_: &TaskRequest, _: &()| -> Attempt<(), ()> { panic!("pool panic") },
                (),
            )
            .await;
    }
}
