//! Bounded retry with linear backoff for remote call sites.

use std::thread;
use std::time::Duration;

use tracing::warn;

/// Retry policy: up to `max_attempts` tries, sleeping `base_delay * n`
/// after the nth failure. One policy type for every remote call site.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Run `op` until it succeeds or the attempt budget is exhausted.
    /// On exhaustion, returns the attempt count and the last error.
    pub fn run<T, E, F>(&self, mut op: F) -> Result<T, (u32, E)>
    where
        F: FnMut() -> Result<T, E>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    warn!(attempt, error = %err, "remote call failed, retrying");
                    thread::sleep(self.base_delay * attempt);
                }
                Err(err) => return Err((attempt, err)),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            tifo_core::constants::DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(tifo_core::constants::DEFAULT_BASE_DELAY_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn succeeds_first_try() {
        let calls = Cell::new(0u32);
        let result: Result<i32, (u32, String)> = instant_policy(4).run(|| {
            calls.set(calls.get() + 1);
            Ok(7)
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retries_until_success() {
        let calls = Cell::new(0u32);
        let result: Result<i32, (u32, String)> = instant_policy(4).run(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err("transient".to_string())
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausts_budget_and_reports_attempts() {
        let calls = Cell::new(0u32);
        let result: Result<i32, (u32, String)> = instant_policy(4).run(|| {
            calls.set(calls.get() + 1);
            Err("down".to_string())
        });
        let (attempts, err) = result.unwrap_err();
        assert_eq!(attempts, 4);
        assert_eq!(calls.get(), 4);
        assert_eq!(err, "down");
    }

    #[test]
    fn zero_attempts_clamps_to_one() {
        let calls = Cell::new(0u32);
        let result: Result<i32, (u32, String)> = instant_policy(0).run(|| {
            calls.set(calls.get() + 1);
            Err("down".to_string())
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
