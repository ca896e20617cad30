//! Deferred work units driven by the retry driver.
//!
//! A task is anything that, given a [`TaskRequest`] and its arguments, either
//! produces a value, asks to be retried later, or fails fatally. Closures with
//! the right shape are tasks out of the box.

mod traits;
mod types;

pub use traits::Task;
pub use types::{Attempt, TaskRequest};
