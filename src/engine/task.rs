//! # Retryable Task Module
//!
//! A [`RetryableTask`] wraps one unit of work: an operation, the arguments it is
//! invoked with, a retry budget and a retry predicate. Calling the task drives
//! its own retry loop to a terminal outcome, sleeping between attempts with a
//! delay that grows by [`DELAY_MULTIPLIER`] after every retry.

use crate::engine::arguments::Arguments;
use crate::engine::error::{DispatchError, Result};
use crate::engine::functions::{AsyncOperation, OperationRegistry};
use crate::engine::predicate::{Attempt, RetryPredicate};
use crate::engine::retry::{DELAY_MULTIPLIER, RetryConfig, seconds_to_duration};
use crate::engine::session::DispatchSession;
use log::debug;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub struct RetryableTask {
    label: String,
    operation: Arc<dyn AsyncOperation>,
    arguments: Arguments,
    retries_remaining: u32,
    retries_total: u32,
    predicate: RetryPredicate,
    initial_delay: f64,
    current_delay: f64,
}

impl RetryableTask {
    /// Create a task with the default initial delay of half a second
    pub fn new(
        operation: Arc<dyn AsyncOperation>,
        arguments: Arguments,
        retries: u32,
        predicate: RetryPredicate,
    ) -> Self {
        let initial_delay = RetryConfig::default().initial_delay_secs;
        Self {
            label: default_label(&arguments),
            operation,
            arguments,
            retries_remaining: retries,
            retries_total: retries,
            predicate,
            initial_delay,
            current_delay: initial_delay,
        }
    }

    /// Create a task from a retry configuration, rejecting unusable delays
    pub fn from_config(
        operation: Arc<dyn AsyncOperation>,
        arguments: Arguments,
        config: &RetryConfig,
        predicate: RetryPredicate,
    ) -> Result<Self> {
        Self::new(operation, arguments, config.max_retries, predicate)
            .with_initial_delay(config.initial_delay_secs)
    }

    /// Create a task whose arguments come as raw JSON: `null` or an array
    pub fn from_json(
        operation: Arc<dyn AsyncOperation>,
        arguments: Value,
        config: &RetryConfig,
        predicate: RetryPredicate,
    ) -> Result<Self> {
        let arguments = Arguments::try_from(arguments)?;
        Self::from_config(operation, arguments, config, predicate)
    }

    /// Create a task for a named operation
    pub fn from_registry(
        registry: &OperationRegistry,
        name: &str,
        arguments: Arguments,
        config: &RetryConfig,
        predicate: RetryPredicate,
    ) -> Result<Self> {
        let operation = registry.resolve(name)?;
        Self::from_config(operation, arguments, config, predicate)
    }

    pub fn with_initial_delay(mut self, seconds: f64) -> Result<Self> {
        RetryConfig::new(self.retries_total, seconds).validate()?;
        self.initial_delay = seconds;
        self.current_delay = seconds;
        Ok(self)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn retries_remaining(&self) -> u32 {
        self.retries_remaining
    }

    pub fn retries_total(&self) -> u32 {
        self.retries_total
    }

    /// Retries consumed so far
    pub fn retries_used(&self) -> u32 {
        self.retries_total - self.retries_remaining
    }

    pub fn initial_delay(&self) -> f64 {
        self.initial_delay
    }

    /// Delay in seconds that the next retry would wait
    pub fn current_delay(&self) -> f64 {
        self.current_delay
    }

    /// Run the operation until it settles.
    ///
    /// The predicate sees every outcome, successful or not. A positive answer
    /// triggers a retry while budget remains. Once the budget is spent, a
    /// rejected value becomes [`DispatchError::RetriesExhausted`] and a rejected
    /// error is returned as is. Invalid configuration reported by the operation
    /// is returned at once.
    pub async fn call(&mut self, session: &DispatchSession) -> Result<Value> {
        let logger = session.logger();

        loop {
            session.record_call();
            let outcome = self.operation.invoke(&self.arguments).await;

            let wants_retry = match &outcome {
                Ok(value) => (self.predicate)(Attempt::Success(value)),
                Err(error) if error.is_invalid_configuration() => {
                    debug!("Task {} is misconfigured: {}", self.label, error);
                    return outcome;
                }
                Err(error) => (self.predicate)(Attempt::Failure(error)),
            };

            if !wants_retry {
                return outcome;
            }
            if self.retries_remaining == 0 {
                debug!(
                    "Task {} exhausted its {} retries",
                    self.label, self.retries_total
                );
                return outcome.and_then(|last| {
                    Err(DispatchError::RetriesExhausted {
                        retries: self.retries_total,
                        last,
                    })
                });
            }

            self.retries_remaining -= 1;
            session.record_retry();

            logger.info(format!(
                "Waiting for {} seconds for request {}",
                self.current_delay, self.label
            ));
            tokio::time::sleep(seconds_to_duration(self.current_delay)).await;
            self.current_delay *= DELAY_MULTIPLIER;

            logger.info(format!(
                "Retrying Request {}. (retry {} of {})",
                self.label,
                self.retries_used(),
                self.retries_total
            ));
        }
    }
}

impl fmt::Debug for RetryableTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryableTask")
            .field("label", &self.label)
            .field("arguments", &self.arguments)
            .field("retries_remaining", &self.retries_remaining)
            .field("retries_total", &self.retries_total)
            .field("current_delay", &self.current_delay)
            .finish_non_exhaustive()
    }
}

fn default_label(arguments: &Arguments) -> String {
    match arguments.first() {
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "task".to_string(),
    }
}
