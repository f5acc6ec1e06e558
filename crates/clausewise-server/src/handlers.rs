//! HTTP handlers. Every failure leaves as `{ "error": "..." }`.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, StatusCode};
use clausewise_core::{ContractRecord, ExtractedText, InvalidInput, RawDocument};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::AppState;
use crate::error::PipelineError;
use crate::pipeline::Analysis;

/// Multipart field carrying the uploaded document.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Serialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.pipeline.model(),
    }))
}

/// Capability check for cross-origin callers.
pub async fn preflight() -> Json<Value> {
    Json(json!({}))
}

pub async fn extract_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TextResponse>, PipelineError> {
    let doc = read_upload(&state, &headers, multipart).await?;
    let text = state.pipeline.extract(doc).await?;
    Ok(Json(TextResponse {
        text: text.into_string(),
    }))
}

pub async fn process_text(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<ContractRecord>, PipelineError> {
    let Json(body) = body.map_err(|e| InvalidInput::MalformedRequest(e.body_text()))?;
    let text = ExtractedText::new(body.text).ok_or(InvalidInput::NoText)?;
    let record = state.pipeline.analyze_text(&text).await?;
    Ok(Json(record))
}

pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Analysis>, PipelineError> {
    let doc = read_upload(&state, &headers, multipart).await?;
    let analysis = state.pipeline.run(doc).await?;
    Ok(Json(analysis))
}

/// Pull the `file` field out of a multipart body and accept it.
async fn read_upload(
    state: &AppState,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<RawDocument, PipelineError> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "request is not a multipart upload");
        InvalidInput::MissingFile
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(state, headers, e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let declared = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error(state, headers, e))?;

        let doc = state.pipeline.accept(bytes, declared.as_deref())?;
        debug!(size = doc.size(), file_name = ?file_name, "upload accepted");
        return Ok(match file_name {
            Some(name) => doc.with_file_name(name),
            None => doc,
        });
    }
    Err(InvalidInput::MissingFile.into())
}

fn upload_error(state: &AppState, headers: &HeaderMap, e: MultipartError) -> PipelineError {
    let max = state.pipeline.limits().max_bytes;
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let size = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(max);
        InvalidInput::TooLarge { size, max }.into()
    } else {
        InvalidInput::MalformedRequest(e.body_text()).into()
    }
}
