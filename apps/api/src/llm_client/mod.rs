//! LLM Client — the single point of entry for all Gemini API calls in Jobsmith.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini generateContent API
//! directly. All completion calls MUST go through `CompletionModel`.
//!
//! Model and temperature are fixed per process: every agent in the pipeline
//! shares one handle with one sampling configuration.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_API_VERSION: &str = "v1beta";
/// The model used for all completion calls.
/// Intentionally hardcoded to prevent accidental drift between agents.
pub const MODEL: &str = "gemini-2.0-flash";
/// Fixed sampling temperature shared by every task in a run.
pub const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("credential '{0}' is not configured")]
    CredentialMissing(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model refused the request: {0}")]
    Refused(String),

    #[error("model returned no text content")]
    EmptyContent,

    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// Seam over the hosted text-generation service.
///
/// The pipeline only ever needs "prompt in, text out"; tests substitute a
/// scripted implementation to make runs deterministic.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// The shared Gemini client used by every agent.
/// Wraps the generateContent API with retry on 429/5xx.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    /// The key is optional at construction: a missing key surfaces as
    /// `CredentialMissing` on the first call, not at startup.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url,
        }
    }

    fn build_request_body(prompt: &str) -> Value {
        json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": prompt}]
                }
            ],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS
            }
        })
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::CredentialMissing("GOOGLE_API_KEY".to_string()))?;

        let url = format!(
            "{}/{}/models/{}:generateContent?key={}",
            self.base_url, GEMINI_API_VERSION, MODEL, api_key
        );
        let request_body = Self::build_request_body(prompt);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self.client.post(&url).json(&request_body).send().await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.pointer("/error/message")
                            .and_then(|m| m.as_str())
                            .map(String::from)
                    })
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: Value = response.json().await?;
            let text = extract_text(&body)?;

            debug!("LLM call succeeded: {} chars returned", text.len());

            return Ok(text);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Pulls the concatenated text parts out of a generateContent response.
/// Safety blocks map to `Refused`; an answer with no text parts is `EmptyContent`.
fn extract_text(body: &Value) -> Result<String, LlmError> {
    if let Some(reason) = body
        .pointer("/promptFeedback/blockReason")
        .and_then(|r| r.as_str())
    {
        return Err(LlmError::Refused(format!("prompt blocked: {reason}")));
    }

    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or(LlmError::EmptyContent)?;

    let finish_reason = candidate
        .get("finishReason")
        .and_then(|f| f.as_str())
        .unwrap_or("");
    if matches!(finish_reason, "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST") {
        return Err(LlmError::Refused(format!(
            "generation stopped: {finish_reason}"
        )));
    }

    let text: String = candidate
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }

    Ok(text)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
