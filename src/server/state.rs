//! Shared application state

use std::sync::Arc;

use crate::pipeline::RagContext;

/// Shared, read-only serving state
#[derive(Clone)]
pub struct AppState {
    context: Arc<RagContext>,
}

impl AppState {
    /// Wrap an initialized context
    pub fn new(context: RagContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    /// The query pipeline context
    pub fn context(&self) -> &RagContext {
        &self.context
    }
}
