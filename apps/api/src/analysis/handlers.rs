//! Axum route handlers for the resume-analysis API.
//!
//! Gate ordering is deliberate: the cheap local checks (mime type,
//! extractable text, resume-likeness) all run before the first network
//! call, so a bad upload never costs an LLM round trip.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::matcher::looks_like_resume;
use crate::analysis::prompts::{
    ATS_PROMPT_TEMPLATE, JD_MATCH_PROMPT_TEMPLATE, RESUME_CHECK_PROMPT_TEMPLATE,
    SUGGEST_SKILLS_PROMPT_TEMPLATE,
};
use crate::errors::AppError;
use crate::llm_client::{parse_json_reply, parse_string_array_reply};
use crate::state::AppState;

/// How much of the resume the secondary LLM gate sees.
const RESUME_CHECK_EXCERPT_CHARS: usize = 2000;
/// Auto mode derives the job focus from the resume's own top section.
const TOP_SECTION_CHARS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Request / response types
// ────────────────────────────────────────────────────────────────────────────

/// Reply shape for POST /analyze.
#[derive(Debug, Serialize)]
pub struct JdAnalysis {
    #[serde(rename = "match")]
    pub match_score: f64,
    pub missing_keywords: Vec<String>,
    pub match_keywords: Vec<String>,
    pub summary: String,
}

impl JdAnalysis {
    /// The zeroed-but-well-shaped result an unparseable model reply
    /// degrades to.
    fn degraded() -> Self {
        JdAnalysis {
            match_score: 0.0,
            missing_keywords: vec![],
            match_keywords: vec![],
            summary: "Analysis failed, empty response.".to_string(),
        }
    }
}

/// What the model is asked to return in explicit-JD mode. Every field
/// defaults so a partially-shaped reply still parses.
#[derive(Debug, Deserialize)]
struct JdVerdict {
    #[serde(rename = "match", default)]
    match_score: f64,
    #[serde(default)]
    missing_keywords: Vec<String>,
    #[serde(default)]
    summary: String,
}

/// Reply shape for POST /analyze-auto. Doubles as the model's expected
/// output shape in that mode.
#[derive(Debug, Serialize, Deserialize)]
pub struct AtsAnalysis {
    #[serde(rename = "match", default)]
    pub match_score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl AtsAnalysis {
    fn degraded() -> Self {
        AtsAnalysis {
            match_score: 0.0,
            strengths: vec![],
            weaknesses: vec![],
            summary: "Analysis failed, empty response.".to_string(),
        }
    }
}

struct ResumeUpload {
    bytes: Bytes,
    jd_text: String,
    user_id: Option<Uuid>,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Drains the multipart stream. The `resume` part must be a PDF; `jd` and
/// `user_id` are optional text parts.
async fn read_upload(multipart: &mut Multipart) -> Result<ResumeUpload, AppError> {
    let mut bytes: Option<Bytes> = None;
    let mut jd_text = String::new();
    let mut user_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                if field.content_type() != Some("application/pdf") {
                    return Err(AppError::InvalidFileType);
                }
                bytes = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read resume upload: {e}"))
                })?);
            }
            Some("jd") => {
                jd_text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read jd field: {e}")))?;
            }
            Some("user_id") => {
                let raw = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read user_id field: {e}"))
                })?;
                user_id = Some(
                    raw.parse()
                        .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?,
                );
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or(AppError::InvalidFileType)?;
    Ok(ResumeUpload {
        bytes,
        jd_text,
        user_id,
    })
}

/// Runs the local gates shared by both analysis modes and returns the
/// extracted resume text.
fn gated_resume_text(state: &AppState, bytes: &[u8]) -> Result<String, AppError> {
    let text = state.extractor.extract_text(bytes)?;
    if text.trim().is_empty() {
        return Err(AppError::EmptyPdf);
    }
    if !looks_like_resume(&text) {
        return Err(AppError::NotResumeLike(
            "The uploaded PDF does not appear to be a resume.".to_string(),
        ));
    }
    Ok(text)
}

/// Char-boundary-safe prefix; resumes are rarely ASCII-only.
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Explicit-JD mode: local gates → LLM resume check → match prompt against
/// the supplied job description. `match_keywords` comes from the local
/// heuristic matcher, independent of the model's own keyword judgment.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<JdAnalysis>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    let resume_text = gated_resume_text(&state, &upload.bytes)?;
    let jd_text = upload.jd_text.to_lowercase();

    let analysis = tokio::time::timeout(
        state.config.analysis_timeout,
        run_jd_analysis(&state, &resume_text, &jd_text),
    )
    .await
    .map_err(|_| AppError::AnalysisTimeout)??;

    Ok(Json(analysis))
}

async fn run_jd_analysis(
    state: &AppState,
    resume_text: &str,
    jd_text: &str,
) -> Result<JdAnalysis, AppError> {
    let model = state.llm.select_model().await?;

    let check_prompt = RESUME_CHECK_PROMPT_TEMPLATE.replace(
        "{resume_excerpt}",
        char_prefix(resume_text, RESUME_CHECK_EXCERPT_CHARS),
    );
    let check_reply = state.llm.generate(model, &check_prompt).await?;
    if check_reply.to_lowercase().contains("no") {
        return Err(AppError::NotResumeLike(
            "The uploaded file does not look like a resume.".to_string(),
        ));
    }

    let prompt = JD_MATCH_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{jd_text}", jd_text);
    let reply = state.llm.generate(model, &prompt).await?;

    let Some(verdict) = parse_json_reply::<JdVerdict>(&reply) else {
        warn!("Unparseable match reply, degrading to empty result");
        return Ok(JdAnalysis::degraded());
    };

    let match_keywords = state.matcher.matched_skills(jd_text, resume_text).await?;

    Ok(JdAnalysis {
        match_score: verdict.match_score,
        missing_keywords: verdict.missing_keywords,
        match_keywords,
        summary: verdict.summary,
    })
}

/// POST /analyze-auto
///
/// ATS mode: no job description; the resume's top section is the job
/// focus. Only the local gates run here — no LLM resume check, no
/// heuristic merge. Optionally persists the verdict onto the user row.
pub async fn handle_analyze_auto(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AtsAnalysis>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    let resume_text = gated_resume_text(&state, &upload.bytes)?;

    let analysis = tokio::time::timeout(
        state.config.analysis_timeout,
        run_ats_analysis(&state, &resume_text),
    )
    .await
    .map_err(|_| AppError::AnalysisTimeout)??;

    if state.config.persist_analysis {
        if let Some(user_id) = upload.user_id {
            persist_verdict(&state, user_id, &analysis).await?;
        }
    }

    Ok(Json(analysis))
}

async fn run_ats_analysis(state: &AppState, resume_text: &str) -> Result<AtsAnalysis, AppError> {
    let model = state.llm.select_model().await?;

    let prompt = ATS_PROMPT_TEMPLATE
        .replace("{top_section}", char_prefix(resume_text, TOP_SECTION_CHARS))
        .replace("{resume_text}", resume_text);
    let reply = state.llm.generate(model, &prompt).await?;

    Ok(parse_json_reply::<AtsAnalysis>(&reply).unwrap_or_else(|| {
        warn!("Unparseable ATS reply, degrading to empty result");
        AtsAnalysis::degraded()
    }))
}

/// Writes the ATS verdict onto the user row. Only reached when
/// PERSIST_ANALYSIS is on and the upload named a user.
async fn persist_verdict(
    state: &AppState,
    user_id: Uuid,
    analysis: &AtsAnalysis,
) -> Result<(), AppError> {
    let score = analysis.match_score.round().clamp(0.0, 100.0) as i32;
    let result = sqlx::query(
        "UPDATE users SET ats_score = $1, resume_strength = $2, resume_weakness = $3, \
         updated_at = now() WHERE id = $4",
    )
    .bind(score)
    .bind(&analysis.strengths)
    .bind(&analysis.weaknesses)
    .bind(user_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        warn!("Analysis persistence skipped: user {user_id} not found");
    } else {
        info!("Persisted ATS verdict for user {user_id} (score {score})");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SuggestSkillsRequest {
    #[serde(default)]
    pub role: String,
}

/// POST /suggest-skills
///
/// One prompt asking for 5-7 skills for a free-text job role. Returns a
/// bare JSON array; an unparseable reply degrades toward empty.
pub async fn handle_suggest_skills(
    State(state): State<AppState>,
    Json(request): Json<SuggestSkillsRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::Validation("Job role is required".to_string()));
    }

    let skills = tokio::time::timeout(state.config.analysis_timeout, async {
        let model = state.llm.select_model().await?;
        let prompt = SUGGEST_SKILLS_PROMPT_TEMPLATE.replace("{role}", request.role.trim());
        let reply = state.llm.generate(model, &prompt).await?;
        Ok::<_, AppError>(parse_string_array_reply(&reply))
    })
    .await
    .map_err(|_| AppError::AnalysisTimeout)??;

    Ok(Json(skills))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_prefix_respects_multibyte_boundaries() {
        let text = "héllo wörld";
        assert_eq!(char_prefix(text, 4), "héll");
        assert_eq!(char_prefix(text, 100), text);
    }

    #[test]
    fn test_degraded_jd_analysis_keeps_wire_shape() {
        let json = serde_json::to_value(JdAnalysis::degraded()).unwrap();
        assert_eq!(json["match"], 0.0);
        assert!(json["missing_keywords"].as_array().unwrap().is_empty());
        assert!(json["match_keywords"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"], "Analysis failed, empty response.");
    }

    #[test]
    fn test_degraded_ats_analysis_keeps_wire_shape() {
        let json = serde_json::to_value(AtsAnalysis::degraded()).unwrap();
        assert_eq!(json["match"], 0.0);
        assert!(json["strengths"].as_array().unwrap().is_empty());
        assert!(json["weaknesses"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_jd_verdict_fields_default_when_missing() {
        let verdict: JdVerdict = serde_json::from_str(r#"{"match": 64}"#).unwrap();
        assert_eq!(verdict.match_score, 64.0);
        assert!(verdict.missing_keywords.is_empty());
        assert!(verdict.summary.is_empty());
    }

    #[test]
    fn test_ats_analysis_parses_full_reply() {
        let reply = r#"{
            "match": 71,
            "strengths": ["quantified impact"],
            "weaknesses": ["no summary section"],
            "summary": "Solid backend resume."
        }"#;
        let analysis: AtsAnalysis = serde_json::from_str(reply).unwrap();
        assert_eq!(analysis.match_score, 71.0);
        assert_eq!(analysis.strengths, vec!["quantified impact"]);
        assert_eq!(analysis.weaknesses, vec!["no summary section"]);
    }
}
