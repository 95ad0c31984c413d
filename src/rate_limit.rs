//! Minimum spacing between consecutive book-detail fetches.

use std::time::Duration;

/// Default spacing between book-detail fetches.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Sleeps away whatever remains of the minimum interval after a timed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    /// Build from a seconds value given on the command line or in config.
    /// Rejects negative, zero, and non-finite values.
    pub fn from_secs_f64(secs: f64) -> Result<Self, String> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(format!(
                "waiting time must be a positive number of seconds, got {}",
                secs
            ));
        }
        Duration::try_from_secs_f64(secs)
            .map(Self::new)
            .map_err(|e| format!("waiting time {} is out of range: {}", secs, e))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// `max(0, min_interval - elapsed)`.
    pub fn delay_after(&self, elapsed: Duration) -> Duration {
        self.min_interval.saturating_sub(elapsed)
    }

    /// Sleep for [delay_after](Self::delay_after) and return the delay applied.
    pub fn wait(&self, elapsed: Duration) -> Duration {
        let delay = self.delay_after(elapsed);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        delay
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
