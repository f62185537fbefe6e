use crate::error::Result;
use rand::Rng;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Bounded retry with exponential backoff for a single unit of write work.
///
/// The default makes exactly one attempt: failures surface immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            exponential_base: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Execute operation with retry logic
    pub fn execute<F, T>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        self.execute_counted(operation).0
    }

    /// Like [`execute`](Self::execute), also returning the number of attempts made.
    pub fn execute_counted<F, T>(&self, mut operation: F) -> (Result<T>, u32)
    where
        F: FnMut() -> Result<T>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation() {
                Ok(result) => return (Ok(result), attempt),
                Err(err) => {
                    if !err.is_recoverable() || attempt >= max_attempts {
                        return (Err(err), attempt);
                    }

                    let delay = self.delay_for(attempt);
                    debug!(
                        "Write failed (attempt {}/{}): {}, retrying in {:?}",
                        attempt, max_attempts, err, delay
                    );
                    thread::sleep(delay);
                }
            }
        }
    }

    /// Backoff before attempt `attempt + 1`.
    fn delay_for(&self, attempt: u32) -> Duration {
        let max_secs = self.max_delay.as_secs_f64();
        let mut secs = (self.initial_delay.as_secs_f64()
            * self.exponential_base.powf(attempt as f64 - 1.0))
        .min(max_secs);

        if self.jitter {
            let jitter_factor: f64 = rand::rng().random_range(0.5..1.5);
            secs = (secs * jitter_factor).min(max_secs);
        }

        Duration::from_secs_f64(secs.max(0.0))
    }
}
