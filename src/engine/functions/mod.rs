use crate::engine::arguments::Arguments;
use crate::engine::error::{DispatchError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub mod mock_api;
pub use mock_api::MockApi;

// Re-export all built-in operations for easier access
pub mod builtins {
    use super::*;

    // Standard operation names used for registering built-ins
    pub const MOCK_API: &str = "mock_api";

    // Get all built-in operations with their standard names
    pub fn get_all_operations() -> Vec<(String, Arc<dyn AsyncOperation>)> {
        let mock_api: Arc<dyn AsyncOperation> = Arc::new(MockApi::default());
        vec![(MOCK_API.to_string(), mock_api)]
    }
}

/// Interface for the asynchronous work a task drives
///
/// The dispatcher makes no assumption about what an operation does (network
/// call, disk I/O, pure computation). It is invoked once per attempt with the
/// same arguments and either resolves to a value or fails with a
/// [`DispatchError`]. Returning [`DispatchError::InvalidConfiguration`] marks
/// the call itself as malformed; such failures are never retried.
#[async_trait]
pub trait AsyncOperation: Send + Sync {
    async fn invoke(&self, arguments: &Arguments) -> Result<Value>;
}

/// Adapts an async closure into an [`AsyncOperation`]
///
/// The closure receives an owned copy of the arguments on every attempt.
pub struct OperationFn<F> {
    func: F,
}

impl<F, Fut> OperationFn<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> AsyncOperation for OperationFn<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn invoke(&self, arguments: &Arguments) -> Result<Value> {
        (self.func)(arguments.as_slice().to_vec()).await
    }
}

/// Wraps an async closure as a shared operation handle
pub fn operation_fn<F, Fut>(func: F) -> Arc<dyn AsyncOperation>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(OperationFn::new(func))
}

/// Named operations that tasks can be built from
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<String, Arc<dyn AsyncOperation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in operations
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, operation) in builtins::get_all_operations() {
            registry.register(name, operation);
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, operation: Arc<dyn AsyncOperation>) {
        self.operations.insert(name.into(), operation);
    }

    /// Look up an operation; unknown names are a configuration error
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn AsyncOperation>> {
        self.operations.get(name).cloned().ok_or_else(|| {
            DispatchError::invalid_configuration(format!(
                "Cannot call an invalid function: {name}"
            ))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.operations.keys().collect();
        names.sort();
        f.debug_struct("OperationRegistry")
            .field("operations", &names)
            .finish()
    }
}
