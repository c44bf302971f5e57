use crate::engine::arguments::Arguments;
use crate::engine::error::{DispatchError, Result};
use crate::engine::functions::AsyncOperation;
use crate::engine::logger::Logger;
use async_trait::async_trait;
use rand::Rng;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::Instant;

/// Request number used when the operation is called without arguments
const DEFAULT_REQUEST: i64 = 10;

/// A stand-in for a remote API call.
///
/// Each invocation waits a random latency, then fails with
/// `500 Internal Server Error` with probability `fail_rate` or resolves to an
/// empty JSON array. Accepts zero arguments or a single request identifier.
#[derive(Debug, Clone)]
pub struct MockApi {
    fail_rate: f64,
    min_latency: Duration,
    max_latency: Duration,
    null_on_error: bool,
    logger: Logger,
    started: Instant,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl MockApi {
    pub fn new(fail_rate: f64) -> Self {
        Self {
            fail_rate: if fail_rate.is_nan() {
                0.0
            } else {
                fail_rate.clamp(0.0, 1.0)
            },
            min_latency: Duration::from_secs(1),
            max_latency: Duration::from_secs(2),
            null_on_error: false,
            logger: Logger::quiet(),
            started: Instant::now(),
        }
    }

    /// Range the simulated latency is drawn from
    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.min_latency = min;
        self.max_latency = max.max(min);
        self
    }

    /// Report failures as a `null` result instead of an error
    pub fn null_on_error(mut self, enabled: bool) -> Self {
        self.null_on_error = enabled;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn fail_rate(&self) -> f64 {
        self.fail_rate
    }

    /// Seconds since the mock was created, to two decimals
    fn elapsed(&self) -> f64 {
        (self.started.elapsed().as_secs_f64() * 100.0).round() / 100.0
    }

    fn request_id(arguments: &Arguments) -> Result<Value> {
        match arguments.as_slice() {
            [] => Ok(json!(DEFAULT_REQUEST)),
            [request] => Ok(request.clone()),
            more => Err(DispatchError::invalid_configuration(format!(
                "mock_api takes at most one argument, got {}",
                more.len()
            ))),
        }
    }

    // ThreadRng is not Send, so draw everything before the first await.
    fn roll(&self) -> (Duration, bool) {
        let mut rng = rand::thread_rng();
        let latency = if self.min_latency < self.max_latency {
            rng.gen_range(self.min_latency..self.max_latency)
        } else {
            self.min_latency
        };
        let failed = rng.gen_bool(self.fail_rate);
        (latency, failed)
    }
}

#[async_trait]
impl AsyncOperation for MockApi {
    async fn invoke(&self, arguments: &Arguments) -> Result<Value> {
        let request = Self::request_id(arguments)?;
        let (latency, failed) = self.roll();

        self.logger
            .info(format!("Request {request} start: {}", self.elapsed()));
        tokio::time::sleep(latency).await;

        if failed {
            self.logger
                .info(format!("Request {request} error: {}", self.elapsed()));
            if self.null_on_error {
                return Ok(Value::Null);
            }
            return Err(DispatchError::http(500, "Internal Server Error"));
        }

        self.logger
            .info(format!("Request {request} finish: {}", self.elapsed()));
        Ok(json!([]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::logger::MemorySink;
    use std::sync::Arc;

    fn instant_api(fail_rate: f64) -> MockApi {
        MockApi::new(fail_rate).with_latency(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_success_returns_empty_array() {
        let api = instant_api(0.0);
        assert_eq!(api.invoke(&Arguments::list([1])).await, Ok(json!([])));
    }

    #[tokio::test]
    async fn test_failure_is_internal_server_error() {
        let api = instant_api(1.0);
        let err = api.invoke(&Arguments::list([1])).await.unwrap_err();

        assert_eq!(err, DispatchError::http(500, "Internal Server Error"));
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn test_null_on_error() {
        let api = instant_api(1.0).null_on_error(true);
        assert_eq!(api.invoke(&Arguments::None).await, Ok(Value::Null));
    }

    #[tokio::test]
    async fn test_too_many_arguments_is_invalid() {
        let api = instant_api(0.0);
        let err = api.invoke(&Arguments::list([1, 2])).await.unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[tokio::test]
    async fn test_logs_start_and_finish() {
        let sink = MemorySink::new();
        let api = instant_api(0.0).with_logger(Logger::new(true, Arc::new(sink.clone())));

        api.invoke(&Arguments::None).await.unwrap();

        assert!(sink.contains("Request 10 start:"));
        assert!(sink.contains("Request 10 finish:"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_within_range() {
        let api = MockApi::new(0.0)
            .with_latency(Duration::from_secs(1), Duration::from_secs(2));
        let start = Instant::now();

        api.invoke(&Arguments::list([0])).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed <= Duration::from_secs(2));
    }

    #[test]
    fn test_fail_rate_is_clamped() {
        assert_eq!(MockApi::new(3.0).fail_rate(), 1.0);
        assert_eq!(MockApi::new(-1.0).fail_rate(), 0.0);
    }
}
