pub mod arguments;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod functions;
pub mod logger;
pub mod predicate;
pub mod report;
pub mod retry;
pub mod session;
pub mod task;

// Re-export key types for easier access
pub use arguments::Arguments;
pub use config::DispatchConfig;
pub use dispatcher::WaveDispatcher;
pub use functions::{AsyncOperation, MockApi, OperationFn, OperationRegistry, operation_fn};
pub use logger::{LogCrateSink, LogSink, Logger, MemorySink};
pub use predicate::{Attempt, RetryPredicate};
pub use report::{DispatchReport, WaveSummary};
pub use retry::{DELAY_MULTIPLIER, RetryConfig};
pub use session::DispatchSession;
pub use task::RetryableTask;
