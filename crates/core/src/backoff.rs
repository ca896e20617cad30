//! Delay inserted between a failed attempt and the next one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Function mapping "retries so far" to a delay.
pub type BackoffFn = dyn Fn(u32) -> Duration + Send + Sync;

/// Backoff specification for a retry run.
#[derive(Clone)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),
    /// Delay computed from the 0-based retry count, before it is incremented.
    Computed(Arc<BackoffFn>),
}

impl Backoff {
    /// No delay between attempts.
    pub fn none() -> Self {
        Self::Fixed(Duration::ZERO)
    }

    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed(delay)
    }

    /// Wrap an arbitrary delay function.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// `base * multiplier^retries`, capped at `max`.
    ///
    /// With `base = 2s` and `multiplier = 2.0` this yields 2s, 4s, 8s, ...
    pub fn exponential(base: Duration, multiplier: f64, max: Duration) -> Self {
        Self::computed(move |retries| {
            let factor = multiplier.powi(retries.min(i32::MAX as u32) as i32);
            let secs = base.as_secs_f64() * factor;
            Duration::try_from_secs_f64(secs)
                .map(|delay| delay.min(max))
                .unwrap_or(max)
        })
    }

    /// Delay to sleep after the retry numbered `retries` (0-based).
    ///
    /// The driver only sleeps between attempts, never after the final one, so
    /// a run with `max_retries = n` asks for at most `n` delays.
    pub fn delay_for(&self, retries: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Computed(f) => f(retries),
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Fixed(Duration::from_secs(10))
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Duration> for Backoff {
    fn from(delay: Duration) -> Self {
        Self::Fixed(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ignores_retry_count() {
        let backoff = Backoff::fixed(Duration::from_millis(250));
        assert_eq!(backoff.delay_for(0), Duration::from_millis(250));
        assert_eq!(backoff.delay_for(9), Duration::from_millis(250));
    }

    #[test]
    fn test_computed_receives_retry_count() {
        let backoff = Backoff::computed(|retries| Duration::from_secs(2u64.pow(retries + 1)));
        assert_eq!(backoff.delay_for(0), Duration::from_secs(2));
        assert_eq!(backoff.delay_for(1), Duration::from_secs(4));
        assert_eq!(backoff.delay_for(3), Duration::from_secs(16));
    }

    #[test]
    fn test_exponential_is_capped() {
        let backoff = Backoff::exponential(
            Duration::from_secs(1),
            2.0,
            Duration::from_secs(10),
        );
        assert_eq!(backoff.delay_for(0), Duration::from_secs(1));
        assert_eq!(backoff.delay_for(2), Duration::from_secs(4));
        assert_eq!(backoff.delay_for(4), Duration::from_secs(10));
        assert_eq!(backoff.delay_for(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_default_and_debug() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay_for(0), Duration::from_secs(10));
        assert_eq!(format!("{:?}", backoff), "Fixed(10s)");
        assert_eq!(format!("{:?}", Backoff::computed(|_| Duration::ZERO)), "Computed(..)");
        assert_eq!(Backoff::none().delay_for(5), Duration::ZERO);
    }
}
