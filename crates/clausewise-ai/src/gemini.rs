//! Gemini `generateContent` client.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{AnalysisClient, AnalysisError, AnalysisReply};
use crate::config::GeminiConfig;
use crate::prompt::AnalysisRequest;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Analysis client for Google's Gemini API.
pub struct GeminiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiClient {
    /// Build a client from explicit configuration.
    ///
    /// Fails with [`AnalysisError::AuthFailure`] when no API key is configured.
    pub fn new(config: &GeminiConfig) -> Result<Self, AnalysisError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AnalysisError::AuthFailure(
                    "no API key configured (set GEMINI_API_KEY)".to_string(),
                )
            })?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AnalysisError::ServiceUnavailable(format!("HTTP client setup: {e}")))?;

        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            url,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, AnalysisError> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: request.prompt(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: "application/json",
            },
        };

        let start = Instant::now();
        info!(
            model = %self.model,
            prompt_chars = request.prompt().chars().count(),
            "requesting contract analysis"
        );

        let resp = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let retry_after_secs = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let text = resp.text().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!(model = %self.model, status = status.as_u16(), body = %text, "analysis call failed");
            return Err(classify_status(status, &text, retry_after_secs));
        }

        let reply = reply_text(&text)?;
        debug!(
            model = %self.model,
            reply_chars = reply.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis reply received"
        );
        Ok(AnalysisReply::new(reply))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn transport_error(e: reqwest::Error) -> AnalysisError {
    if e.is_timeout() {
        AnalysisError::ServiceUnavailable("request timed out".to_string())
    } else {
        AnalysisError::ServiceUnavailable(e.to_string())
    }
}

/// Map a non-success status onto the failure taxonomy.
fn classify_status(status: StatusCode, body: &str, retry_after_secs: Option<u64>) -> AnalysisError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AnalysisError::AuthFailure(message),
        // Gemini reports a bad key as 400 with this reason code.
        StatusCode::BAD_REQUEST if body.contains("API_KEY_INVALID") => {
            AnalysisError::AuthFailure(message)
        }
        StatusCode::TOO_MANY_REQUESTS => AnalysisError::QuotaExceeded {
            message,
            retry_after_secs,
        },
        StatusCode::REQUEST_TIMEOUT => AnalysisError::ServiceUnavailable(message),
        s if s.is_server_error() => AnalysisError::ServiceUnavailable(message),
        s if s.is_client_error() => AnalysisError::Rejected {
            status: s.as_u16(),
            message,
        },
        s => AnalysisError::UnexpectedResponseShape(format!("unexpected status {s}")),
    }
}

/// Concatenated text parts of the first candidate.
fn reply_text(body: &str) -> Result<String, AnalysisError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::UnexpectedResponseShape(format!("response is not JSON: {e}")))?;

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AnalysisError::UnexpectedResponseShape(format!(
            "prompt blocked: {reason}"
        )));
    }

    let candidate = parsed.candidates.into_iter().next().ok_or_else(|| {
        AnalysisError::UnexpectedResponseShape("response has no candidates".to_string())
    })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(AnalysisError::UnexpectedResponseShape(format!(
            "candidate has no text (finish reason {reason})"
        )));
    }
    Ok(text)
}
