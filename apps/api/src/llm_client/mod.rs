//! Anthropic Messages API client used by the LLM assessment backend.
//!
//! Both assessment tasks ask for a single JSON object, so the client exposes
//! one operation: send a prompt, pull the JSON object out of the answer and
//! deserialize it.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;

pub mod prompts;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
/// Assessments and summaries are a few sentences long.
const MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Delay before the single retry of a throttled or failed request.
const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Answer is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Answer contains no JSON object")]
    EmptyContent,
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e.to_string())
    }
}

impl LlmError {
    fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Turn<'a>; 1],
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, api_key })
    }

    /// Sends `prompt` and deserializes the JSON object in the answer.
    /// Throttling, 5xx and connection failures are retried once.
    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str, system: &str) -> Result<T, LlmError> {
        let answer = match self.complete(prompt, system).await {
            Err(e) if e.is_transient() => {
                warn!("LLM request failed ({e}), retrying in {}s", RETRY_DELAY.as_secs());
                tokio::time::sleep(RETRY_DELAY).await;
                self.complete(prompt, system).await?
            }
            other => other?,
        };
        parse_json_answer(&answer)
    }

    /// Concatenated text blocks of one Messages API answer.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&MessagesRequest {
                model: MODEL,
                max_tokens: MAX_TOKENS,
                system,
                messages: [Turn {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = response.json().await?;
        let text: String = body
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text)
            .collect();
        debug!("LLM answered with {} chars", text.len());
        Ok(text)
    }
}

/// The outermost `{ ... }` span of a model answer. Models sometimes wrap
/// the object in a code fence or a sentence of preamble.
fn json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

pub fn parse_json_answer<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let json = json_object(text).ok_or(LlmError::EmptyContent)?;
    serde_json::from_str(json).map_err(|e| {
        let preview: String = json.chars().take(200).collect();
        warn!("Model answer is not the expected JSON ({e}): {preview}");
        LlmError::Parse(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        summary: String,
    }

    #[test]
    fn test_json_object_ignores_fences_and_preamble() {
        assert_eq!(json_object("```json\n{\"a\": 1}\n```"), Some("{\"a\": 1}"));
        assert_eq!(json_object("Claro, aquí está: {\"a\": {\"b\": 2}} ¡Saludos!"), Some("{\"a\": {\"b\": 2}}"));
        assert_eq!(json_object("sin objeto"), None);
        assert_eq!(json_object("} al revés {"), None);
    }

    #[test]
    fn test_parse_json_answer() {
        let ok: Answer = parse_json_answer("```json\n{\"summary\": \"Cajera con 3 años.\"}\n```").unwrap();
        assert_eq!(ok.summary, "Cajera con 3 años.");
        assert!(matches!(parse_json_answer::<Answer>("   "), Err(LlmError::EmptyContent)));
        assert!(matches!(parse_json_answer::<Answer>("{\"resumen\": 1}"), Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_only_throttling_and_server_errors_are_transient() {
        let api = |status| LlmError::Api {
            status,
            message: String::new(),
        };
        assert!(api(429).is_transient());
        assert!(api(529).is_transient());
        assert!(!api(400).is_transient());
        assert!(!LlmError::EmptyContent.is_transient());
    }

    #[test]
    fn test_llm_errors_map_to_llm_app_error() {
        let err: AppError = LlmError::EmptyContent.into();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
