pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::auth::handlers as auth;
use crate::candidates::cv::MAX_CV_BYTES;
use crate::candidates::handlers as candidates;
use crate::catalog::handlers as catalog;
use crate::chat::handlers as chat;
use crate::reports::handlers as reports;
use crate::state::AppState;
use crate::users::handlers as users;

/// Multipart framing on top of the largest accepted PDF.
const CV_BODY_LIMIT: usize = MAX_CV_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/me", get(auth::handle_me))
        // Catalog
        .route("/api/catalog", get(catalog::handle_get_catalog))
        .route(
            "/api/catalog/locations/:ubicacion/zones",
            get(catalog::handle_get_zones),
        )
        // Candidates
        .route(
            "/api/candidates",
            get(candidates::handle_list_candidates).post(candidates::handle_create_candidate),
        )
        .route("/api/candidates/stats", get(candidates::handle_candidate_stats))
        .route("/api/candidates/bulk", post(candidates::handle_bulk_action))
        .route(
            "/api/candidates/cv",
            post(candidates::handle_cv_upload).layer(DefaultBodyLimit::max(CV_BODY_LIMIT)),
        )
        .route(
            "/api/candidates/:id",
            get(candidates::handle_get_candidate)
                .put(candidates::handle_update_candidate)
                .delete(candidates::handle_delete_candidate),
        )
        // AI assistance
        .route(
            "/api/candidates/:id/assessment",
            post(assessment::handle_assess_candidate),
        )
        .route(
            "/api/candidates/:id/summary",
            post(assessment::handle_summarize_candidate),
        )
        .route("/api/ai/summarize", post(assessment::handle_summarize_text))
        // Reports
        .route("/api/reports", get(reports::handle_get_report))
        .route("/api/reports/candidates.csv", get(reports::handle_export_csv))
        // Users
        .route(
            "/api/users",
            get(users::handle_list_users).post(users::handle_create_user),
        )
        .route(
            "/api/users/:id",
            put(users::handle_update_user).delete(users::handle_delete_user),
        )
        // Chat
        .route(
            "/api/chat/messages",
            get(chat::handle_list_messages).post(chat::handle_send_message),
        )
        .route(
            "/api/chat/messages/:id",
            put(chat::handle_edit_message).delete(chat::handle_delete_message),
        )
        .route("/api/chat/poll", get(chat::handle_poll))
        .route(
            "/api/chat/status",
            get(chat::handle_online_users).post(chat::handle_set_status),
        )
        .route(
            "/api/chat/typing",
            get(chat::handle_list_typing).post(chat::handle_set_typing),
        )
        .route("/api/chat/events", get(chat::handle_events))
        .with_state(state)
}
