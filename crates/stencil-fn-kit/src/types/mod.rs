use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stores::EnvironmentStore;

pub mod conversion;
pub mod diagnostics;
pub mod function_errors;
pub mod functions;
pub mod stores;
pub mod type_compatibility;
pub mod types;

#[cfg(test)]
mod tests;

/// Cooperative cancellation flag shared by everything rendering one template.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-render context threaded through every invocation. The binding layer
/// passes it to implementations without looking inside.
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    pub cancellation: CancellationToken,
    pub environment: Option<Arc<EnvironmentStore>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        ExecutionContext::default()
    }

    pub fn with_environment(mut self, environment: Arc<EnvironmentStore>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn environment(&self) -> Option<&EnvironmentStore> {
        self.environment.as_deref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
