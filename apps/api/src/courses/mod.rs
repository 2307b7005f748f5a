//! Course suggestions — YouTube Data API proxy.
//!
//! The dashboard turns a student's job role into tutorial searches. The
//! API key stays server-side and the response is trimmed to what the UI
//! renders.

use axum::extract::{Query, State};
use axum::Json;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const DEFAULT_RESULTS: u8 = 6;
const MAX_RESULTS: u8 = 25;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseVideo {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    fallback: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// Entries without a video id (channels, playlists) are dropped; the
/// medium thumbnail is preferred over the default one.
fn collect_videos(response: SearchResponse) -> Vec<CourseVideo> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let Snippet {
                title,
                channel_title,
                published_at,
                thumbnails,
            } = item.snippet;
            let thumbnail_url = thumbnails
                .and_then(|t| t.medium.or(t.fallback))
                .map(|t| t.url);
            Some(CourseVideo {
                video_id,
                title,
                channel: channel_title,
                thumbnail_url,
                published_at,
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    pub async fn search(&self, query: &str, limit: u8) -> Result<Vec<CourseVideo>, AppError> {
        let max_results = limit.clamp(1, MAX_RESULTS).to_string();
        let params = [
            ("part", "snippet"),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("q", query),
            ("key", self.api_key.as_str()),
        ];

        let response = self
            .client
            .get(YOUTUBE_SEARCH_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::VideoSearch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VideoSearch(format!(
                "YouTube API returned {status}: {body}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::VideoSearch(e.to_string()))?;

        let videos = collect_videos(parsed);
        debug!("YouTube search for {query:?} returned {} videos", videos.len());
        Ok(videos)
    }
}

#[derive(Debug, Deserialize)]
pub struct CourseQuery {
    pub query: String,
    pub limit: Option<u8>,
}

/// GET /courses
pub async fn handle_suggest_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseQuery>,
) -> Result<Json<Vec<CourseVideo>>, AppError> {
    if params.query.trim().is_empty() {
        return Err(AppError::Validation("query is required".to_string()));
    }

    let youtube = state.youtube.as_ref().ok_or_else(|| {
        AppError::VideoSearch("YOUTUBE_API_KEY is not configured".to_string())
    })?;

    let videos = youtube
        .search(params.query.trim(), params.limit.unwrap_or(DEFAULT_RESULTS))
        .await?;
    Ok(Json(videos))
}
