/*!
# Wave-dispatch

A bounded-concurrency task dispatcher that drives many independent asynchronous operations
(API calls, disk I/O, any async work) while limiting how many run at once and retrying
transient failures with exponential backoff.

## Overview

Work is described as a list of [`RetryableTask`]s. The [`WaveDispatcher`] splits that list into
consecutive waves no larger than its concurrency limit, runs the tasks of a wave concurrently,
and waits for all of them to settle before starting the next wave. A failing task never aborts
its wave: its slot in the result sequence is filled with a fallback value instead.

Each task owns its retry loop. After every attempt a caller-supplied predicate looks at the
outcome, successful result or error alike, and decides whether to try again. Retries stop when
the predicate says no or the task's budget runs out; the delay between attempts starts at the
configured initial delay and grows by a factor of 1.5 after every retry.

## Key Components

* **WaveDispatcher**: partitions tasks into waves and collects ordered results
* **RetryableTask**: one operation plus its arguments, retry budget, predicate and backoff state
* **AsyncOperation**: trait implemented by the work a task drives
* **DispatchSession**: counters for calls and retries owned by a single run
* **DispatchReport**: ordered results plus per-wave and per-failure details

## Usage Example

```rust,no_run
use wave_dispatch::{Arguments, DispatchError, RetryableTask, WaveDispatcher, operation_fn, predicate};
use serde_json::{Value, json};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fetch = operation_fn(|args: Vec<Value>| async move {
        let id = args[0].clone();
        if id == json!(3) {
            Err(DispatchError::http(500, "Internal Server Error"))
        } else {
            Ok(json!({ "id": id }))
        }
    });

    let tasks = (0..10)
        .map(|i| RetryableTask::new(fetch.clone(), Arguments::list([i]), 2, predicate::on_error()))
        .collect();

    let report = WaveDispatcher::new(4)?.run(tasks).await;

    println!("{report}");
    assert_eq!(report.results.len(), 10);
    Ok(())
}
```

## Custom Operations

Anything implementing [`AsyncOperation`] can be dispatched:

```rust,no_run
use async_trait::async_trait;
use wave_dispatch::{Arguments, AsyncOperation, Result, RetryableTask, WaveDispatcher, predicate};
use serde_json::{Value, json};
use std::sync::Arc;

struct Lookup;

#[async_trait]
impl AsyncOperation for Lookup {
    async fn invoke(&self, arguments: &Arguments) -> Result<Value> {
        Ok(json!({ "key": arguments.first().cloned() }))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let lookup: Arc<dyn AsyncOperation> = Arc::new(Lookup);
    let task = RetryableTask::new(lookup, Arguments::list(["users"]), 0, predicate::never());

    let report = WaveDispatcher::new(1)?.run(vec![task]).await;
    assert!(report.is_success());
    Ok(())
}
```
*/

pub mod engine;

// Re-export all public APIs for easier access
pub use engine::error::{DispatchError, ErrorInfo, Result};
pub use engine::predicate;
pub use engine::{
    Arguments, AsyncOperation, Attempt, DELAY_MULTIPLIER, DispatchConfig, DispatchReport,
    DispatchSession, LogCrateSink, LogSink, Logger, MemorySink, MockApi, OperationFn,
    OperationRegistry, RetryConfig, RetryPredicate, RetryableTask, WaveDispatcher, WaveSummary,
    operation_fn,
};
