use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::quota::QuotaController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Process-wide cooldown state. Written only by the controller itself
    /// (tripped through the LLM client); handlers read snapshots.
    pub quota: Arc<QuotaController>,
    /// Kept on state for handlers that grow config knobs later.
    #[allow(dead_code)]
    pub config: Config,
}
