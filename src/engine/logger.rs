//! # Logging Collaborator
//!
//! Progress lines ("Retrying Request 3.") are plain strings handed to a
//! [`LogSink`]. The [`Logger`] in front of it drops informational lines when
//! verbose output is off; error lines always reach the sink.

use log::Level;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Destination for plain-text log lines. Implementations must not fail.
pub trait LogSink: Send + Sync {
    fn line(&self, level: Level, line: &str);
}

/// Forwards every line to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn line(&self, level: Level, line: &str) {
        log::log!(target: "wave_dispatch", level, "{line}");
    }
}

/// Keeps every line in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines received so far
    pub fn lines(&self) -> Vec<(Level, String)> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, line)| line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn line(&self, level: Level, line: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push((level, line.to_string()));
    }
}

/// Verbosity gate in front of a sink
#[derive(Clone)]
pub struct Logger {
    verbose: bool,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new(verbose: bool, sink: Arc<dyn LogSink>) -> Self {
        Self { verbose, sink }
    }

    /// A logger that only lets errors through
    pub fn quiet() -> Self {
        Self::new(false, Arc::new(LogCrateSink))
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn info(&self, line: impl AsRef<str>) {
        if self.verbose {
            self.sink.line(Level::Info, line.as_ref());
        }
    }

    pub fn error(&self, line: impl AsRef<str>) {
        self.sink.line(Level::Error, line.as_ref());
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(true, Arc::new(LogCrateSink))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}
