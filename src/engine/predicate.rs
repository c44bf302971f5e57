//! # Retry Predicates
//!
//! A predicate looks at the outcome of one attempt, successful or not, and
//! answers whether the task should try again. The task still enforces its
//! retry budget; the predicate only expresses intent.

use crate::engine::error::DispatchError;
use serde_json::Value;
use std::sync::Arc;

/// Outcome of a single attempt, as seen by a retry predicate
#[derive(Debug, Clone, Copy)]
pub enum Attempt<'a> {
    Success(&'a Value),
    Failure(&'a DispatchError),
}

impl Attempt<'_> {
    pub fn is_failure(&self) -> bool {
        matches!(self, Attempt::Failure(_))
    }
}

/// Shared retry decision function
pub type RetryPredicate = Arc<dyn for<'a> Fn(Attempt<'a>) -> bool + Send + Sync>;

/// Wraps a closure as a [`RetryPredicate`]
pub fn from_fn<F>(predicate: F) -> RetryPredicate
where
    F: for<'a> Fn(Attempt<'a>) -> bool + Send + Sync + 'static,
{
    Arc::new(predicate)
}

/// Retry after every attempt
pub fn always() -> RetryPredicate {
    from_fn(|_| true)
}

/// Never retry
pub fn never() -> RetryPredicate {
    from_fn(|_| false)
}

/// Retry whenever the operation failed
pub fn on_error() -> RetryPredicate {
    from_fn(|attempt| attempt.is_failure())
}

/// Retry on failure or when the operation produced `null`
pub fn on_null_or_error() -> RetryPredicate {
    from_fn(|attempt| match attempt {
        Attempt::Success(value) => value.is_null(),
        Attempt::Failure(_) => true,
    })
}

/// Retry only errors classified as transient by [`DispatchError::retryable`]
pub fn on_retryable_error() -> RetryPredicate {
    from_fn(|attempt| match attempt {
        Attempt::Success(_) => false,
        Attempt::Failure(error) => error.retryable(),
    })
}
