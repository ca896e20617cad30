//! Blocking sleep used between attempts.

use std::time::Duration;

/// Blocks the calling thread for a backoff delay.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration);
}

/// Sleeps on the current OS thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_thread_sleeper_zero_returns_immediately() {
        let start = Instant::now();
        ThreadSleeper.sleep(Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_thread_sleeper_blocks() {
        let start = Instant::now();
        ThreadSleeper.sleep(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
