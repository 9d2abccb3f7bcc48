use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::dedup::seen_store::SeenJobsStore;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub aggregator: Arc<Aggregator>,
    pub seen_jobs: Arc<SeenJobsStore>,
    /// Absent when `ANTHROPIC_API_KEY` is not configured; the recommendation
    /// endpoint then runs rule-based only.
    pub llm: Option<LlmClient>,
}
