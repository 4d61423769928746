/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All AI interactions MUST go through this module, because this is where
/// rate-limit signals are converted into quota cooldown state.
///
/// Model: gemini-1.5-flash-latest (hardcoded — do not make configurable to
/// prevent drift)
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::quota::{QuotaController, DEFAULT_COOLDOWN_SECS};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all enhancement calls.
pub const MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI quota exceeded; retry in {retry_after_seconds}s")]
    RateLimited {
        retry_after_seconds: u64,
        message: String,
    },

    #[error("AI service unavailable: {0}")]
    Unavailable(String),

    #[error("AI service returned no usable text")]
    InvalidResponse,

    #[error("AI service rejected the credentials")]
    Unauthorized,
}

/// Seam for the enhancement pipeline: anything that can turn a prompt into a
/// reply. Production uses [`LlmClient`]; tests inject a canned generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
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
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

impl GeminiResponse {
    /// Extracts the generated text from the first candidate's first text part.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|p| p.text.as_deref()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// The single Gemini client used by the enhancement pipeline.
///
/// Holds the shared quota controller: requests are rejected locally while a
/// cooldown runs, and an upstream 429 trips the cooldown for everyone.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    quota: Arc<QuotaController>,
}

impl LlmClient {
    pub fn new(api_key: String, quota: Arc<QuotaController>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            quota,
        }
    }

    async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        // Local admission check: while cooling, fail without a network call.
        if let Some(remaining) = self.quota.active_cooldown() {
            return Err(LlmError::RateLimited {
                retry_after_seconds: remaining,
                message: "AI quota exceeded. Please wait for the cooldown to finish.".to_string(),
            });
        }

        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_header = parse_retry_after_header(&response);
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_error_status(status, retry_after_header, &body));
        }

        let reply: GeminiResponse = response.json().await.map_err(|e| {
            warn!("Gemini reply was not valid JSON: {e}");
            LlmError::InvalidResponse
        })?;

        let text = reply.text().ok_or(LlmError::InvalidResponse)?;
        debug!(chars = text.len(), "Gemini call succeeded");
        Ok(text.to_string())
    }

    fn map_error_status(
        &self,
        status: StatusCode,
        retry_after_header: Option<u64>,
        body: &str,
    ) -> LlmError {
        let parsed = serde_json::from_str::<GeminiError>(body).ok();
        let message = parsed
            .as_ref()
            .map(|e| e.error.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Gemini API returned {status}"));

        let quota_exceeded = status == StatusCode::TOO_MANY_REQUESTS
            || parsed
                .as_ref()
                .is_some_and(|e| e.error.status == "RESOURCE_EXHAUSTED")
            || message.to_lowercase().contains("quota");

        if quota_exceeded {
            let retry_after_seconds = retry_after_header
                .or_else(|| {
                    parsed
                        .as_ref()
                        .and_then(|e| parse_retry_delay(&e.error.details))
                })
                .unwrap_or(DEFAULT_COOLDOWN_SECS);
            warn!(retry_after_seconds, "Gemini rate limit hit: {message}");
            // The only error kind that touches quota state.
            self.quota.trip(message.clone(), retry_after_seconds);
            return LlmError::RateLimited {
                retry_after_seconds,
                message,
            };
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized,
            _ => {
                warn!("Gemini API returned {status}: {message}");
                LlmError::Unavailable(message)
            }
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.call(prompt).await
    }
}

fn parse_retry_after_header(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Pulls `retryDelay` out of a google.rpc.RetryInfo error detail ("28s").
fn parse_retry_delay(details: &[serde_json::Value]) -> Option<u64> {
    details.iter().find_map(|detail| {
        detail
            .get("retryDelay")
            .and_then(|v| v.as_str())
            .and_then(|s| s.trim_end_matches('s').parse().ok())
    })
}
