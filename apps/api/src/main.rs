mod assessment;
mod auth;
mod candidates;
mod catalog;
mod chat;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod pagination;
mod reports;
mod routes;
mod state;
mod users;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::select_assessor;
use crate::candidates::seed::seed_demo_candidates;
use crate::chat::ChatHub;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::ensure_bootstrap_admin;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CandidatoScope API v{}", env!("CARGO_PKG_VERSION"));

    // SQLite pool + migrations
    let db = create_pool(&config.database_url).await?;

    if ensure_bootstrap_admin(&db, config.bootstrap_admin.as_ref()).await? {
        info!("Bootstrap administrator created");
    }
    if config.seed_demo_data {
        seed_demo_candidates(&db).await?;
    }

    let llm = match config.anthropic_api_key.clone() {
        Some(key) => {
            let client = LlmClient::new(key)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, using heuristic assessments");
            None
        }
    };
    let assessor = select_assessor(llm);

    let state = AppState {
        db,
        config: config.clone(),
        assessor,
        chat: ChatHub::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
