use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::ExperienceSummary;
use crate::auth::permissions::Permission;
use crate::auth::AuthUser;
use crate::candidates::bulk::{execute_bulk, BulkAction, BulkRequest, BulkResult};
use crate::candidates::cv::{detect_contact_data, extract_pdf_text, CvDetections};
use crate::candidates::filters::CandidateQuery;
use crate::candidates::repository::{self, CandidateStats};
use crate::candidates::validation::{validate_candidate, CandidateInput};
use crate::errors::AppError;
use crate::models::candidate::Candidate;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CandidateListResponse {
    pub data: Vec<Candidate>,
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

pub(crate) async fn load_candidate(state: &AppState, id: Uuid) -> Result<Candidate, AppError> {
    repository::get_candidate(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidato {id} no encontrado")))
}

/// GET /api/candidates
pub async fn handle_list_candidates(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<CandidateListResponse>, AppError> {
    user.require(Permission::CandidatesRead)?;
    let (filter, page) = query.into_filter().map_err(AppError::InvalidInput)?;
    let result = repository::list_candidates(&state.db, &filter, page).await?;
    Ok(Json(CandidateListResponse {
        data: result.candidates,
        count: result.count,
        page: result.pagination.map(|p| p.page),
        total_pages: result.pagination.map(|p| p.total_pages),
    }))
}

/// GET /api/candidates/stats
pub async fn handle_candidate_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CandidateStats>, AppError> {
    user.require(Permission::CandidatesRead)?;
    Ok(Json(repository::candidate_stats(&state.db).await?))
}

/// GET /api/candidates/:id
pub async fn handle_get_candidate(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidate>, AppError> {
    user.require(Permission::CandidatesRead)?;
    Ok(Json(load_candidate(&state, id).await?))
}

/// POST /api/candidates
pub async fn handle_create_candidate(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CandidateInput>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    user.require(Permission::CandidatesCreate)?;
    let now = Utc::now();
    let new = validate_candidate(&input, now).map_err(AppError::InvalidInput)?;
    let created = repository::insert_candidate(&state.db, &new, now).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/candidates/:id
pub async fn handle_update_candidate(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CandidateInput>,
) -> Result<Json<Candidate>, AppError> {
    user.require(Permission::CandidatesUpdate)?;
    let existing = load_candidate(&state, id).await?;

    let now = Utc::now();
    let merged = CandidateInput::from(&existing).overlay(patch);
    let changes = validate_candidate(&merged, now).map_err(AppError::InvalidInput)?;

    let updated = repository::update_candidate(&state.db, id, &changes, now)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidato {id} no encontrado")))?;
    Ok(Json(updated))
}

/// DELETE /api/candidates/:id
pub async fn handle_delete_candidate(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require(Permission::CandidatesDelete)?;
    if !repository::delete_candidate(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Candidato {id} no encontrado")));
    }
    tracing::info!("Candidate {id} deleted by {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/candidates/bulk
pub async fn handle_bulk_action(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BulkRequest>,
) -> Result<Json<BulkResult>, AppError> {
    user.require(Permission::BulkActionsExecute)?;
    if matches!(req.action, BulkAction::Delete { .. }) {
        user.require(Permission::CandidatesDelete)?;
    }
    req.validate()?;
    Ok(Json(execute_bulk(&state.db, &req.ids, &req.action, Utc::now()).await?))
}

#[derive(Deserialize)]
pub struct CvQuery {
    #[serde(default)]
    pub summarize: bool,
}

#[derive(Serialize)]
pub struct CvResponse {
    pub file_name: Option<String>,
    pub text: String,
    #[serde(flatten)]
    pub detections: CvDetections,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ExperienceSummary>,
}

/// Oversized uploads keep their 413; any other framing problem is a 400.
fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("El archivo excede el tamaño máximo de 10 MB".into())
    } else {
        AppError::Validation(format!("Carga inválida: {e}"))
    }
}

/// POST /api/candidates/cv
pub async fn handle_cv_upload(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CvQuery>,
    mut multipart: Multipart,
) -> Result<Json<CvResponse>, AppError> {
    user.require(Permission::CandidatesCreate)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(String::from);
            let data = field.bytes().await.map_err(upload_error)?;
            upload = Some((file_name, data));
            break;
        }
    }
    let (file_name, data) = upload.ok_or_else(|| AppError::Validation("Falta el archivo (campo \"file\")".into()))?;

    let text = extract_pdf_text(data).await?;
    let detections = detect_contact_data(&text);

    let summary = if query.summarize && !text.trim().is_empty() {
        Some(state.assessor.summarize_experience(&text).await?)
    } else {
        None
    };

    Ok(Json(CvResponse {
        file_name,
        text,
        detections,
        summary,
    }))
}
