use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::candidates::repository::count_candidates;
use crate::state::AppState;

/// GET /health
/// Reports service version and database reachability; 503 when the database is down.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match count_candidates(&state.db).await {
        Ok(count) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "service": "candidatoscope-api",
                "database": { "connected": true, "candidate_count": count }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "version": env!("CARGO_PKG_VERSION"),
                    "service": "candidatoscope-api",
                    "database": { "connected": false }
                })),
            )
        }
    }
}
