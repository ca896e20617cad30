//! Sleeper that records delays instead of sleeping.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::sleeper::Sleeper;

/// Records every requested delay and returns immediately.
///
/// Clones share the same record, so a test can keep one handle and give
/// another to the driver.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|delays| delays.clone())
            .unwrap_or_default()
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }

    pub fn clear(&self) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.clear();
        }
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(delay);
        }
    }
}
