use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::extractor::TextExtractor;
use crate::analysis::matcher::SkillMatcher;
use crate::config::Config;
use crate::courses::YouTubeClient;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Present only when YOUTUBE_API_KEY is configured.
    pub youtube: Option<YouTubeClient>,
    pub config: Config,
    /// Narrow seam over the PDF integration library.
    pub extractor: Arc<dyn TextExtractor>,
    /// Pluggable keyword matcher carrying the injected skill vocabulary.
    pub matcher: Arc<dyn SkillMatcher>,
}
