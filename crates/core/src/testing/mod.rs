//! Testing utilities for code built on the retry driver.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use syncretry_core::testing::{RecordingSleeper, ScriptedTask, Step};
//! use syncretry_core::{RetryDriver, RetryPolicy};
//!
//! let sleeper = RecordingSleeper::new();
//! let driver = RetryDriver::new(RetryPolicy::new(2).with_backoff(Duration::from_secs(30)))
//!     .with_sleeper(Arc::new(sleeper.clone()));
//!
//! let task: ScriptedTask<u32, String> =
//!     ScriptedTask::new(vec![Step::retry("busy".to_string()), Step::Succeed(1)]);
//!
//! assert_eq!(driver.run(task.clone(), ()).unwrap(), 1);
//! assert_eq!(task.invocation_count(), 2);
//! assert_eq!(sleeper.delays(), vec![Duration::from_secs(30)]);
//! ```

mod recording_sleeper;
mod scripted_task;

pub use recording_sleeper::RecordingSleeper;
pub use scripted_task::{ScriptedTask, Step};
