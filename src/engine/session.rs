use crate::engine::logger::Logger;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// State shared by every task of one dispatch run.
///
/// Clones share the same counters, so a caller can keep a handle and read the
/// totals after the run finishes.
#[derive(Debug, Clone)]
pub struct DispatchSession {
    id: Arc<str>,
    retries: Arc<AtomicU64>,
    calls: Arc<AtomicU64>,
    logger: Logger,
}

impl DispatchSession {
    pub fn new(logger: Logger) -> Self {
        Self {
            id: Arc::from(Uuid::now_v7().to_string()),
            retries: Arc::new(AtomicU64::new(0)),
            calls: Arc::new(AtomicU64::new(0)),
            logger,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Total retry attempts issued so far
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Total operation invocations so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub(crate) fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for DispatchSession {
    fn default() -> Self {
        Self::new(Logger::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counters() {
        let session = DispatchSession::new(Logger::quiet());
        let handle = session.clone();

        session.record_call();
        session.record_call();
        session.record_retry();

        assert_eq!(handle.calls(), 2);
        assert_eq!(handle.retries(), 1);
        assert_eq!(handle.id(), session.id());
    }

    #[test]
    fn test_sessions_are_independent() {
        let first = DispatchSession::new(Logger::quiet());
        let second = DispatchSession::new(Logger::quiet());

        first.record_retry();

        assert_eq!(first.retries(), 1);
        assert_eq!(second.retries(), 0);
        assert_ne!(first.id(), second.id());
    }
}
