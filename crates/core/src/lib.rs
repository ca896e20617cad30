//! Drive retrying deferred tasks to completion on the calling thread.

pub mod backoff;
pub mod config;
pub mod driver;
pub mod metrics;
pub mod sleeper;
pub mod task;
pub mod testing;

pub use backoff::Backoff;
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, BackoffConfig,
    Config, ConfigError, LoggingConfig, RetryConfig,
};
pub use driver::{
    apply_with_retry, ExecutionContext, FailureKind, RetryDriver, RetryError, RetryPolicy,
};
pub use sleeper::{Sleeper, ThreadSleeper};
pub use task::{Attempt, Task, TaskRequest};
