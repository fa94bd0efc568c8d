use std::sync::Arc;

use sqlx::SqlitePool;

use crate::assessment::suitability::CandidateAssessor;
use crate::chat::ChatHub;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    /// LLM-backed when an API key is configured, heuristic otherwise.
    pub assessor: Arc<dyn CandidateAssessor>,
    pub chat: ChatHub,
}

#[cfg(test)]
impl AppState {
    /// In-memory database, test config and the heuristic assessor.
    pub async fn for_tests() -> Self {
        Self {
            db: crate::db::test_pool().await,
            config: Config::for_tests(),
            assessor: crate::assessment::select_assessor(None),
            chat: ChatHub::new(),
        }
    }
}
