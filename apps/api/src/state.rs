use std::sync::Arc;

use crate::llm_client::CompletionProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion provider. `LlmClient` in production, stubs in tests.
    pub llm: Arc<dyn CompletionProvider>,
}
