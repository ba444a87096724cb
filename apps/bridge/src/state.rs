use std::sync::Arc;

use crate::llm_client::CompletionBackend;
use crate::servicenow::RecordSource;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; both clients are immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// ServiceNow lookups. Default: `ServiceNowClient`.
    pub records: Arc<dyn RecordSource>,
    /// Chat completions. Default: `LlmClient`.
    pub llm: Arc<dyn CompletionBackend>,
}
