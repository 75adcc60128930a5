use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one model handle every agent in a run shares. Behind a trait so
    /// tests can substitute a deterministic stub.
    pub model: Arc<dyn CompletionModel>,
    pub config: Config,
}
