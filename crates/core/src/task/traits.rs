use super::types::{Attempt, TaskRequest};

/// A deferred unit of work that can ask to be retried.
///
/// `A` is the argument bundle forwarded unchanged to every invocation.
/// Implementations must be shareable across threads because a timed attempt
/// runs on a watchdog-supervised thread.
pub trait Task<A>: Send + Sync + 'static {
    type Output: Send + 'static;
    type Error: Send + 'static;

    /// Run one attempt.
    fn run(&self, request: &TaskRequest, args: &A) -> Attempt<Self::Output, Self::Error>;

    /// Name used in logs and as the `task` metric label.
    ///
    /// Closures all report `"task"`; wrap them in a named type to tell runs
    /// apart in metrics.
    fn name(&self) -> &str {
        "task"
    }

    /// Stop the attempt made with `request` after it overran its time limit.
    ///
    /// Called on the driver thread before the backoff and the next attempt.
    /// The default does nothing and the overrunning thread is abandoned;
    /// tasks that own cancellable work, such as a child process, stop it
    /// here so no two attempts are ever in flight together.
    fn cancel(&self, _request: &TaskRequest) {}
}

impl<F, A, T, E> Task<A> for F
where
    F: Fn(&TaskRequest, &A) -> Attempt<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn run(&self, request: &TaskRequest, args: &A) -> Attempt<T, E> {
        self(request, args)
    }
}
