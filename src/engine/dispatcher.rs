//! # Wave Dispatch Module
//!
//! Runs a list of [`RetryableTask`]s in consecutive waves of at most
//! `concurrency_limit` tasks. The tasks of a wave are polled concurrently on
//! the calling task and the next wave only starts once every task of the
//! current one has settled. Failed tasks are replaced by the fallback value;
//! a failure of the dispatch machinery itself degrades the whole run to
//! fallback values instead of propagating.

use crate::engine::error::{DispatchError, ErrorInfo, Result};
use crate::engine::logger::Logger;
use crate::engine::report::{DispatchReport, WaveSummary};
use crate::engine::session::DispatchSession;
use crate::engine::task::RetryableTask;
use futures::FutureExt;
use futures::future::join_all;
use log::debug;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tokio::time::Instant;

/// Executes tasks in bounded, sequential waves.
///
/// A dispatcher is configured once and consumed by [`WaveDispatcher::run`].
#[derive(Debug, Clone)]
pub struct WaveDispatcher {
    concurrency_limit: usize,
    fallback: Value,
    logger: Logger,
}

impl WaveDispatcher {
    /// Create a dispatcher; the limit must be at least one
    pub fn new(concurrency_limit: usize) -> Result<Self> {
        if concurrency_limit == 0 {
            return Err(DispatchError::invalid_configuration(
                "Concurrency limit must be at least 1",
            ));
        }
        Ok(Self {
            concurrency_limit,
            fallback: Value::Null,
            logger: Logger::default(),
        })
    }

    /// Value substituted for every task that settles as a failure
    pub fn with_fallback(mut self, fallback: Value) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn fallback(&self) -> &Value {
        &self.fallback
    }

    /// Number of tasks per wave for a run over `task_count` tasks
    pub fn wave_size(&self, task_count: usize) -> usize {
        self.concurrency_limit.min(task_count)
    }

    /// Run every task in a fresh session
    pub async fn run(self, tasks: Vec<RetryableTask>) -> DispatchReport {
        let session = DispatchSession::new(self.logger.clone());
        self.run_in_session(tasks, &session).await
    }

    /// Run every task, counting calls and retries in `session`
    pub async fn run_in_session(
        self,
        tasks: Vec<RetryableTask>,
        session: &DispatchSession,
    ) -> DispatchReport {
        let started = Instant::now();
        let task_count = tasks.len();
        let mut report = DispatchReport::new(session.id(), task_count, self.concurrency_limit);

        if task_count > 0 {
            self.logger.info(format!(
                "Dispatching {} tasks in waves of {}",
                task_count,
                self.wave_size(task_count)
            ));
            let outcome = AssertUnwindSafe(self.run_waves(tasks, session, &mut report))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(results)) => report.results = results,
                Ok(Err(error)) => self.degrade(&mut report, error),
                Err(panic) => self.degrade(
                    &mut report,
                    DispatchError::Internal(panic_message(panic.as_ref())),
                ),
            }
        }

        report.calls = session.calls();
        report.retries = session.retries();
        report.elapsed_secs = started.elapsed().as_secs_f64();
        self.logger.info(format!(
            "Dispatch {} finished: {} fallbacks out of {} tasks",
            report.session_id, report.fallbacks, report.tasks
        ));
        report
    }

    async fn run_waves(
        &self,
        mut tasks: Vec<RetryableTask>,
        session: &DispatchSession,
        report: &mut DispatchReport,
    ) -> Result<Vec<Value>> {
        let task_count = tasks.len();
        let wave_size = self.wave_size(task_count);
        let mut results = Vec::with_capacity(task_count);

        for (index, wave) in tasks.chunks_mut(wave_size).enumerate() {
            let offset = index * wave_size;
            debug!(
                "Starting wave {} with tasks {}..{}",
                index,
                offset,
                offset + wave.len()
            );

            let settled = join_all(wave.iter_mut().map(|task| settle(task, session))).await;
            if settled.len() != wave.len() {
                return Err(DispatchError::Internal(format!(
                    "wave {} settled {} of {} tasks",
                    index,
                    settled.len(),
                    wave.len()
                )));
            }

            let mut failures = 0;
            for (position, (task, outcome)) in wave.iter().zip(settled).enumerate() {
                match outcome {
                    Ok(value) => results.push(value),
                    Err(error) => {
                        self.logger
                            .info(format!("Task {} failed: {}", task.label(), error));
                        failures += 1;
                        report.errors.push(ErrorInfo::new(
                            offset + position,
                            task.label(),
                            task.retries_used(),
                            &error,
                        ));
                        results.push(self.fallback.clone());
                    }
                }
            }

            report.fallbacks += failures;
            report.waves.push(WaveSummary {
                index,
                offset,
                size: wave.len(),
                failures,
            });
        }

        if results.len() != task_count {
            return Err(DispatchError::Internal(format!(
                "collected {} results for {} tasks",
                results.len(),
                task_count
            )));
        }
        Ok(results)
    }

    /// Replace every slot with the fallback and report the fault.
    ///
    /// Wave summaries and error records of a partly finished run are dropped
    /// so the report only describes the all-fallback outcome.
    fn degrade(&self, report: &mut DispatchReport, error: DispatchError) {
        self.logger.error(format!(
            "In dispatching waves, service returned an error: {error}"
        ));
        report.results = vec![self.fallback.clone(); report.tasks];
        report.fallbacks = report.tasks;
        report.waves.clear();
        report.errors.clear();
        report.fault = Some(error.to_string());
    }
}

/// Drive one task to its terminal outcome, turning a panic into a failure
async fn settle(task: &mut RetryableTask, session: &DispatchSession) -> Result<Value> {
    AssertUnwindSafe(task.call(session))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(DispatchError::Panicked(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
