use anyhow::{Context, Result};
use std::time::Duration;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub google_api_key: String,
    /// Sentinel address resolved to the "admin" role at login.
    pub admin_email: String,
    /// Optional; when absent the /courses proxy reports video search as
    /// unavailable instead of failing startup.
    pub youtube_api_key: Option<String>,
    /// Whether /analyze-auto writes its verdict onto the user row.
    pub persist_analysis: bool,
    /// Overall deadline for one analysis request, covering the model probe
    /// and every prompt it issues.
    pub analysis_timeout: Duration,
    /// Optional newline-separated skill vocabulary overriding the built-in set.
    pub skill_keywords_file: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            google_api_key: require_env("GOOGLE_API_KEY")?,
            admin_email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin".to_string()),
            youtube_api_key: std::env::var("YOUTUBE_API_KEY").ok(),
            persist_analysis: std::env::var("PERSIST_ANALYSIS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            analysis_timeout: Duration::from_secs(
                std::env::var("ANALYSIS_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "90".to_string())
                    .parse::<u64>()
                    .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            skill_keywords_file: std::env::var("SKILL_KEYWORDS_FILE").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
