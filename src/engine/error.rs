use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the dispatcher
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum DispatchError {
    /// Programming errors in how a task or dispatcher was built (bad arguments,
    /// unknown operation, zero concurrency). Never retried.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Generic failure reported by an operation
    #[error("Operation error: {0}")]
    Operation(String),

    /// HTTP-style failures reported by an operation
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(String),

    /// The operation panicked while being polled
    #[error("Operation panicked: {0}")]
    Panicked(String),

    /// The retry predicate kept rejecting a successful result until the budget ran out
    #[error("Retries exhausted after {retries} retries, last result: {last}")]
    RetriesExhausted { retries: u32, last: serde_json::Value },

    /// Failure of the dispatch machinery itself, not of any single task
    #[error("Internal dispatcher error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Creates a new invalid configuration error
    pub fn invalid_configuration<S: Into<String>>(message: S) -> Self {
        DispatchError::InvalidConfiguration(message.into())
    }

    /// Creates a new HTTP error
    pub fn http<S: Into<String>>(status: u16, message: S) -> Self {
        DispatchError::Http {
            status,
            message: message.into(),
        }
    }

    /// Convert from std::io::Error
    pub fn from_io(err: std::io::Error) -> Self {
        DispatchError::Io(err.to_string())
    }

    /// Convert from serde_json::Error
    pub fn from_serde(err: serde_json::Error) -> Self {
        DispatchError::InvalidConfiguration(err.to_string())
    }

    /// Whether this error represents a broken task or dispatcher setup
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, DispatchError::InvalidConfiguration(_))
    }

    /// Determines if this error is retryable (worth retrying)
    ///
    /// Retryable errors are typically transient infrastructure failures that might succeed on retry.
    /// This classification is only a hint: the retry predicate attached to a task makes the
    /// actual decision, except for invalid configuration which is always terminal.
    pub fn retryable(&self) -> bool {
        match self {
            DispatchError::Http { status, .. } => {
                // 0 means connection error
                *status >= 500 || *status == 429 || *status == 408 || *status == 0
            }
            DispatchError::Timeout(_) => true,
            DispatchError::Io(_) => true,

            DispatchError::InvalidConfiguration(_) => false,
            DispatchError::Operation(_) => false,
            DispatchError::Panicked(_) => false,
            DispatchError::RetriesExhausted { .. } => false,
            DispatchError::Internal(_) => false,
        }
    }

    /// Stable code used in reports
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            DispatchError::Operation(_) => "OPERATION_ERROR",
            DispatchError::Http { .. } => "HTTP_ERROR",
            DispatchError::Timeout(_) => "TIMEOUT_ERROR",
            DispatchError::Io(_) => "IO_ERROR",
            DispatchError::Panicked(_) => "PANIC",
            DispatchError::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            DispatchError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for DispatchError {
    fn from(err: std::io::Error) -> Self {
        DispatchError::from_io(err)
    }
}

/// Type alias for Result with DispatchError
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Structured record of one task slot that settled as a failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code (e.g., "HTTP_ERROR", "INVALID_CONFIGURATION")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Position of the task in the dispatched sequence
    pub index: usize,

    /// Label of the task that failed
    pub task: String,

    /// Number of retries the task used before settling
    pub retry_count: u32,

    /// Timestamp when the failure was recorded
    pub timestamp: String,
}

impl ErrorInfo {
    /// Create a new error info entry for a failed slot
    pub fn new(index: usize, task: impl Into<String>, retry_count: u32, error: &DispatchError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            index,
            task: task.into(),
            retry_count,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(DispatchError::http(500, "Internal Server Error").retryable());
        assert!(DispatchError::http(503, "Service Unavailable").retryable());
        assert!(DispatchError::http(429, "Too Many Requests").retryable());
        assert!(DispatchError::http(408, "Request Timeout").retryable());
        assert!(DispatchError::http(0, "Connection Error").retryable());
        assert!(DispatchError::Timeout("Connection timeout".to_string()).retryable());
        assert!(DispatchError::Io("Network error".to_string()).retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!DispatchError::http(400, "Bad Request").retryable());
        assert!(!DispatchError::http(404, "Not Found").retryable());
        assert!(!DispatchError::invalid_configuration("bad arguments").retryable());
        assert!(!DispatchError::Operation("boom".to_string()).retryable());
        assert!(!DispatchError::Panicked("boom".to_string()).retryable());
        assert!(!DispatchError::Internal("boom".to_string()).retryable());
        assert!(
            !DispatchError::RetriesExhausted {
                retries: 2,
                last: serde_json::Value::Null
            }
            .retryable()
        );
    }

    #[test]
    fn test_display_and_code() {
        let error = DispatchError::http(500, "Internal Server Error");
        assert_eq!(error.to_string(), "HTTP error: 500 - Internal Server Error");
        assert_eq!(error.code(), "HTTP_ERROR");
        assert!(DispatchError::invalid_configuration("x").is_invalid_configuration());

        let exhausted = DispatchError::RetriesExhausted {
            retries: 2,
            last: serde_json::Value::Null,
        };
        assert_eq!(
            exhausted.to_string(),
            "Retries exhausted after 2 retries, last result: null"
        );
        assert_eq!(exhausted.code(), "RETRIES_EXHAUSTED");
    }

    #[test]
    fn test_error_info_from_error() {
        let error = DispatchError::http(500, "Internal Server Error");
        let info = ErrorInfo::new(3, "3", 2, &error);

        assert_eq!(info.code, "HTTP_ERROR");
        assert_eq!(info.message, "HTTP error: 500 - Internal Server Error");
        assert_eq!(info.index, 3);
        assert_eq!(info.task, "3");
        assert_eq!(info.retry_count, 2);
        assert!(!info.timestamp.is_empty());
    }
}
