//! # Dispatch Report Module
//!
//! Summary of one dispatch run: the ordered results, per-wave breakdown,
//! the failures that were replaced by the fallback value, and the session
//! counters (calls and retries).

use crate::engine::error::ErrorInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One wave of concurrently executed tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSummary {
    /// Position of the wave in the run
    pub index: usize,
    /// Index of the first task of the wave in the dispatched sequence
    pub offset: usize,
    /// Number of tasks in the wave
    pub size: usize,
    /// Tasks of the wave that settled as failures
    pub failures: usize,
}

/// Outcome of a complete dispatch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Session the counters belong to
    pub session_id: String,
    /// One value per task, in input order; failed tasks hold the fallback
    pub results: Vec<Value>,
    /// Number of tasks dispatched
    pub tasks: usize,
    /// Concurrency limit the run was configured with
    pub concurrency_limit: usize,
    /// Operation invocations across all tasks, retries included
    pub calls: u64,
    /// Retry attempts across all tasks
    pub retries: u64,
    /// Slots holding the fallback because their task failed
    pub fallbacks: usize,
    /// Waves in execution order
    pub waves: Vec<WaveSummary>,
    /// One entry per failed slot
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ErrorInfo>,
    /// Set when the dispatch machinery itself failed and every slot was
    /// replaced by the fallback
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fault: Option<String>,
    /// Wall-clock runtime in seconds
    pub elapsed_secs: f64,
}

impl DispatchReport {
    pub fn new(session_id: impl Into<String>, tasks: usize, concurrency_limit: usize) -> Self {
        Self {
            session_id: session_id.into(),
            results: Vec::with_capacity(tasks),
            tasks,
            concurrency_limit,
            calls: 0,
            retries: 0,
            fallbacks: 0,
            waves: Vec::new(),
            errors: Vec::new(),
            fault: None,
            elapsed_secs: 0.0,
        }
    }

    /// Whether every task settled successfully
    pub fn is_success(&self) -> bool {
        self.fallbacks == 0 && self.fault.is_none()
    }

    /// Whether the run degraded to an all-fallback result
    pub fn is_degraded(&self) -> bool {
        self.fault.is_some()
    }

    /// Number of results equal to `value`
    pub fn count_of(&self, value: &Value) -> usize {
        self.results.iter().filter(|v| *v == value).count()
    }

    /// Sizes of the waves in execution order
    pub fn wave_sizes(&self) -> Vec<usize> {
        self.waves.iter().map(|w| w.size).collect()
    }

    pub fn into_results(self) -> Vec<Value> {
        self.results
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Retries: {}, Tasks: {}, Calls: {}, Fallbacks: {}, Runtime: {:.2}s, Concurrent: {}",
            self.retries,
            self.tasks,
            self.calls,
            self.fallbacks,
            self.elapsed_secs,
            self.concurrency_limit
        )
    }
}
