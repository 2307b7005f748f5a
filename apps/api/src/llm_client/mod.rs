/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All LLM interactions MUST go through this module.
///
/// Model availability varies by API key and tier and cannot be listed up
/// front; the only reliable check is a trial generation. Callers therefore
/// obtain a model via `select_model` before generating.
use regex::Regex;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Candidates tried in order until one answers a trial generation.
/// Exhausting the list fails the whole request.
pub const MODEL_CANDIDATES: &[&str] = &[
    "gemini-3-pro",
    "gemini-3-flash-preview",
    "gemini-1.5-pro",
    "gemini-pro",
];

/// Cheapest possible generation that proves a candidate is usable.
const PROBE_PROMPT: &str = "Hello";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No working model available")]
    NoModelAvailable,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single LLM client used by every analysis endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Issues one generation against a specific model and returns the
    /// concatenated text parts of the first candidate reply.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{GEMINI_API_BASE}/{model}:generateContent");
        let request_body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!("LLM call against {model} succeeded ({} chars)", text.len());
        Ok(text)
    }

    /// Walks the candidate list issuing a trial generation against each and
    /// returns the first model that answers. The trials are inherently
    /// serial: each depends on the previous one failing.
    pub async fn select_model(&self) -> Result<&'static str, LlmError> {
        for &name in MODEL_CANDIDATES {
            match self.generate(name, PROBE_PROMPT).await {
                Ok(_) => {
                    info!("Selected model: {name}");
                    return Ok(name);
                }
                Err(e) => {
                    warn!("Model {name} not available: {e}");
                }
            }
        }
        Err(LlmError::NoModelAvailable)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient reply parsing
// ────────────────────────────────────────────────────────────────────────────

/// Removes markdown code-fence markers wherever they appear in a reply.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse policy for JSON-object replies: strip fences and try a direct
/// parse, then retry on the first-`{`-to-last-`}` slice. `None` means the
/// caller's zeroed fallback applies — a malformed reply never fails the
/// HTTP request.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Option<T> {
    let cleaned = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Some(value);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Array replies (skill suggestions) degrade differently: failed JSON
/// parsing falls back to collecting quoted substrings, then to empty.
pub fn parse_string_array_reply(text: &str) -> Vec<String> {
    let cleaned = strip_code_fences(text);
    if let Ok(values) = serde_json::from_str::<Vec<String>>(&cleaned) {
        return values;
    }

    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let re = QUOTED.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("quoted-string regex"));
    re.captures_iter(text).map(|c| c[1].to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        #[serde(default)]
        score: u32,
        #[serde(default)]
        summary: String,
    }

    #[test]
    fn test_strip_code_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_reply_direct() {
        let reply = r#"{"score": 80, "summary": "solid"}"#;
        let verdict: Verdict = parse_json_reply(reply).unwrap();
        assert_eq!(verdict.score, 80);
    }

    #[test]
    fn test_parse_json_reply_fenced() {
        let reply = "```json\n{\"score\": 55, \"summary\": \"ok\"}\n```";
        let verdict: Verdict = parse_json_reply(reply).unwrap();
        assert_eq!(verdict.score, 55);
    }

    #[test]
    fn test_parse_json_reply_prose_wrapped_uses_brace_scan() {
        let reply = "Sure! Here is the analysis: {\"score\": 42, \"summary\": \"meh\"} Hope it helps.";
        let verdict: Verdict = parse_json_reply(reply).unwrap();
        assert_eq!(verdict.score, 42);
    }

    #[test]
    fn test_parse_json_reply_garbage_is_none() {
        assert_eq!(parse_json_reply::<Verdict>("I cannot do that."), None);
        assert_eq!(parse_json_reply::<Verdict>("} backwards {"), None);
    }

    #[test]
    fn test_parse_string_array_reply_well_formed() {
        let reply = r#"["Rust", "SQL", "Docker"]"#;
        assert_eq!(parse_string_array_reply(reply), vec!["Rust", "SQL", "Docker"]);
    }

    #[test]
    fn test_parse_string_array_reply_fenced() {
        let reply = "```json\n[\"Git\", \"Linux\"]\n```";
        assert_eq!(parse_string_array_reply(reply), vec!["Git", "Linux"]);
    }

    #[test]
    fn test_parse_string_array_reply_falls_back_to_quoted_substrings() {
        let reply = "Here you go: \"Kubernetes\", \"Terraform\" and \"AWS\".";
        assert_eq!(
            parse_string_array_reply(reply),
            vec!["Kubernetes", "Terraform", "AWS"]
        );
    }

    #[test]
    fn test_parse_string_array_reply_garbage_is_empty() {
        assert!(parse_string_array_reply("no quotes here").is_empty());
    }

    #[test]
    fn test_candidate_order_is_preserved() {
        assert_eq!(MODEL_CANDIDATES[0], "gemini-3-pro");
        assert_eq!(*MODEL_CANDIDATES.last().unwrap(), "gemini-pro");
    }
}
