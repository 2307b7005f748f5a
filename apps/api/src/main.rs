mod analysis;
mod auth;
mod config;
mod courses;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod users;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::extractor::PdfTextExtractor;
use crate::analysis::matcher::{KeywordSkillMatcher, SkillVocabulary};
use crate::config::Config;
use crate::courses::YouTubeClient;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::{LlmClient, MODEL_CANDIDATES};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.google_api_key.clone());
    info!(
        "LLM client initialized ({} model candidates)",
        MODEL_CANDIDATES.len()
    );

    // Video search is optional; the /courses endpoint degrades without it
    let youtube = config.youtube_api_key.clone().map(YouTubeClient::new);
    if youtube.is_none() {
        info!("YOUTUBE_API_KEY not set; /courses will report video search as unavailable");
    }

    // Skill vocabulary: built-in set unless a file override is configured
    let vocabulary = match &config.skill_keywords_file {
        Some(path) => SkillVocabulary::from_file(path)?,
        None => SkillVocabulary::default(),
    };
    info!("Skill vocabulary loaded ({} tokens)", vocabulary.len());

    // Build app state
    let state = AppState {
        db,
        llm,
        youtube,
        config: config.clone(),
        extractor: Arc::new(PdfTextExtractor),
        matcher: Arc::new(KeywordSkillMatcher::new(vocabulary)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
