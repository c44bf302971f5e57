use crate::engine::error::{DispatchError, Result};
use crate::engine::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Process-level settings, read once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Number of tasks to dispatch
    pub calls: usize,
    /// Maximum tasks per wave
    pub concurrency: usize,
    /// Retry budget of every task
    pub retries: u32,
    /// Probability that a mock call fails
    pub fail_rate: f64,
    /// Delay before the first retry, in seconds
    pub initial_delay_secs: f64,
    /// Emit progress lines
    pub verbose: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            calls: 100,
            concurrency: 20,
            retries: 0,
            fail_rate: 0.2,
            initial_delay_secs: RetryConfig::default().initial_delay_secs,
            verbose: true,
        }
    }
}

impl DispatchConfig {
    pub fn from_json(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str).map_err(DispatchError::from_serde)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json_str = fs::read_to_string(path)?;
        Self::from_json(&json_str)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(DispatchError::invalid_configuration(
                "concurrency must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.fail_rate) {
            return Err(DispatchError::invalid_configuration(format!(
                "fail_rate must be between 0 and 1, got {}",
                self.fail_rate
            )));
        }
        self.retry_config().validate()
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.retries, self.initial_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.calls, 100);
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.retries, 0);
        assert_eq!(config.fail_rate, 0.2);
        assert!(config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = DispatchConfig::from_json(r#"{"calls": 5, "retries": 2}"#).unwrap();
        assert_eq!(config.calls, 5);
        assert_eq!(config.retries, 2);
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.retry_config(), RetryConfig::new(2, 0.5));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(DispatchConfig::from_json(r#"{"concurrency": 0}"#).is_err());
        assert!(DispatchConfig::from_json(r#"{"fail_rate": 1.5}"#).is_err());
        assert!(DispatchConfig::from_json(r#"{"initial_delay_secs": -1}"#).is_err());
        assert!(DispatchConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DispatchConfig::from_file("/nonexistent/dispatch.json").unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
    }
}
