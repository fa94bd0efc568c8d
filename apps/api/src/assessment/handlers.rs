use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::assessment::{AssessmentInput, ExperienceSummary, SuitabilityAssessment};
use crate::auth::permissions::Permission;
use crate::auth::AuthUser;
use crate::candidates::handlers::load_candidate;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/candidates/:id/assessment
pub async fn handle_assess_candidate(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuitabilityAssessment>, AppError> {
    user.require(Permission::CandidatesRead)?;
    let candidate = load_candidate(&state, id).await?;
    let assessment = state
        .assessor
        .assess_suitability(&AssessmentInput::from(&candidate))
        .await?;
    tracing::info!(
        "Assessed candidate {id} via {}: es_apto={}",
        assessment.backend,
        assessment.es_apto
    );
    Ok(Json(assessment))
}

/// POST /api/candidates/:id/summary
pub async fn handle_summarize_candidate(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExperienceSummary>, AppError> {
    user.require(Permission::CandidatesRead)?;
    let candidate = load_candidate(&state, id).await?;
    Ok(Json(state.assessor.summarize_experience(&candidate.experiencia).await?))
}

#[derive(Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub experiencia: String,
}

/// POST /api/ai/summarize
pub async fn handle_summarize_text(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<ExperienceSummary>, AppError> {
    user.require(Permission::CandidatesRead)?;
    if req.experiencia.trim().is_empty() {
        return Err(AppError::Validation("La experiencia es requerida".into()));
    }
    Ok(Json(state.assessor.summarize_experience(&req.experiencia).await?))
}
