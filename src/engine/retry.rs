use crate::engine::error::{DispatchError, Result};
use std::time::Duration;

/// Factor applied to the backoff delay after every retry
pub const DELAY_MULTIPLIER: f64 = 1.5;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries
    pub max_retries: u32,
    /// Delay before the first retry, in seconds
    pub initial_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay_secs: 0.5,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_secs: f64) -> Self {
        Self {
            max_retries,
            initial_delay_secs,
        }
    }

    /// Rejects delays that cannot be slept on
    pub fn validate(&self) -> Result<()> {
        if !self.initial_delay_secs.is_finite() || self.initial_delay_secs < 0.0 {
            return Err(DispatchError::invalid_configuration(format!(
                "Initial retry delay must be a finite, non-negative number of seconds, got {}",
                self.initial_delay_secs
            )));
        }
        Ok(())
    }
}

/// Converts fractional seconds to a Duration, saturating once backoff outgrows it
pub(crate) fn seconds_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
