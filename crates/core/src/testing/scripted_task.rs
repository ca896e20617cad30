//! Task that plays back a fixed script of attempt results.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::task::{Attempt, Task, TaskRequest};

/// One scripted attempt.
#[derive(Debug, Clone)]
pub enum Step<T, E> {
    /// Return a value.
    Succeed(T),
    /// Ask for a retry, optionally with a cause.
    Retry(Option<E>),
    /// Fail fatally.
    Fail(E),
    /// Block for the duration, then ask for a retry without a cause.
    Stall(Duration),
}

impl<T, E> Step<T, E> {
    pub fn retry(cause: E) -> Self {
        Self::Retry(Some(cause))
    }

    pub fn retry_later() -> Self {
        Self::Retry(None)
    }

    pub fn stall(duration: Duration) -> Self {
        Self::Stall(duration)
    }
}

#[derive(Debug)]
struct Script<T, E> {
    steps: Vec<Step<T, E>>,
    invocations: Vec<TaskRequest>,
}

/// Mock task driven by a list of [`Step`]s.
///
/// Invocation `n` plays step `n`; once the script runs out the last step
/// repeats. Every invocation's request is recorded for assertions. Clones
/// share the script and the record.
#[derive(Debug)]
pub struct ScriptedTask<T, E> {
    name: String,
    script: Arc<Mutex<Script<T, E>>>,
}

impl<T, E> Clone for ScriptedTask<T, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            script: Arc::clone(&self.script),
        }
    }
}

impl<T, E> ScriptedTask<T, E> {
    /// Create a scripted task. An empty script stalls for one hour.
    pub fn new(steps: Vec<Step<T, E>>) -> Self {
        Self {
            name: "scripted".to_string(),
            script: Arc::new(Mutex::new(Script {
                steps,
                invocations: Vec::new(),
            })),
        }
    }

    /// Set the name reported in logs and metrics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Requests seen so far, in invocation order.
    pub fn invocations(&self) -> Vec<TaskRequest> {
        self.script
            .lock()
            .map(|script| script.invocations.clone())
            .unwrap_or_default()
    }

    pub fn invocation_count(&self) -> usize {
        self.script
            .lock()
            .map(|script| script.invocations.len())
            .unwrap_or_default()
    }
}

impl<T, E, A> Task<A> for ScriptedTask<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = T;
    type Error = E;

    fn run(&self, request: &TaskRequest, _args: &A) -> Attempt<T, E> {
        let step = {
            let mut script = match self.script.lock() {
                Ok(script) => script,
                Err(poisoned) => poisoned.into_inner(),
            };
            let index = script.invocations.len();
            script.invocations.push(*request);
            script
                .steps
                .get(index)
                .or_else(|| script.steps.last())
                .cloned()
                .unwrap_or(Step::Stall(Duration::from_secs(3600)))
        };

        match step {
            Step::Succeed(value) => Attempt::Success(value),
            Step::Retry(cause) => Attempt::RetryRequested(cause),
            Step::Fail(error) => Attempt::Fatal(error),
            Step::Stall(duration) => {
                thread::sleep(duration);
                Attempt::RetryRequested(None)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
