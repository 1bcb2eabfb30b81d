use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every pipeline invocation builds its own model.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Upstream AI backend. Default: Anthropic `LlmClient`; tests inject fakes.
    pub llm: Arc<dyn CompletionBackend>,
    pub retry: RetryPolicy,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn CompletionBackend>) -> Self {
        let retry = config.retry_policy();
        Self { config, llm, retry }
    }
}
