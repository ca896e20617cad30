//! Synchronous retry driver.
//!
//! This module provides the [`RetryDriver`] which:
//! - Invokes a [`Task`](crate::task::Task) on the calling thread
//! - Intercepts retry requests and per-attempt timeouts
//! - Sleeps for the configured backoff between attempts
//! - Surfaces success, exhaustion, timeout, or the task's fatal error
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use syncretry_core::{Attempt, RetryDriver, RetryPolicy, TaskRequest};
//!
//! let policy = RetryPolicy::new(2).with_backoff(Duration::ZERO);
//! let driver = RetryDriver::new(policy);
//!
//! let result = driver.run(
//!     |request: &TaskRequest, name: &String| -> Attempt<String, String> {
//!         if request.retries < 2 {
//!             Attempt::retry("not yet".to_string())
//!         } else {
//!             Attempt::Success(format!("hello {}", name))
//!         }
//!     },
//!     "world".to_string(),
//! );
//! assert_eq!(result.unwrap(), "hello world");
//! ```

mod blocking;
mod context;
mod error;
mod policy;
mod runner;
mod watchdog;

pub use context::{ExecutionContext, FailureKind};
pub use error::RetryError;
pub use policy::RetryPolicy;
pub use runner::{apply_with_retry, RetryDriver};
