//! Pipeline failures and their user-visible form.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clausewise_ai::{AnalysisError, NormalizeError};
use clausewise_core::{ErrorKind, InvalidInput};
use clausewise_extract::ExtractError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

const MIB: usize = 1024 * 1024;

/// A failure at any stage of one document's pipeline. The pipeline stops at
/// the first one.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Input(#[from] InvalidInput),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("analysis call failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("reply normalization failed: {0}")]
    Normalize(#[from] NormalizeError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::InvalidInput,
            Self::Extract(e) => e.kind(),
            Self::Analysis(e) => e.kind(),
            Self::Normalize(e) => e.kind(),
        }
    }

    fn invalid_input(&self) -> Option<&InvalidInput> {
        match self {
            Self::Input(e) | Self::Extract(ExtractError::InvalidInput(e)) => Some(e),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => match self.invalid_input() {
                Some(InvalidInput::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            },
            ErrorKind::ParseFailure | ErrorKind::EmptyResult => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::QuotaExceeded | ErrorKind::ServiceUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ErrorKind::AuthFailure
            | ErrorKind::UnexpectedResponseShape
            | ErrorKind::MalformedReply => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short message safe to show the uploader. Never includes raw
    /// diagnostics such as reply text or upstream bodies.
    pub fn user_message(&self) -> String {
        if let Some(input) = self.invalid_input() {
            return match input {
                InvalidInput::MissingFile => "no file provided".to_string(),
                InvalidInput::EmptyFile => "file is empty".to_string(),
                InvalidInput::TooLarge { max, .. } => {
                    format!("file too large (maximum {} MB)", max.div_ceil(MIB))
                }
                InvalidInput::UnsupportedMediaType(_) => "file is not a PDF".to_string(),
                InvalidInput::NoText => "no text provided".to_string(),
                InvalidInput::MalformedRequest(_) => "request could not be read".to_string(),
            };
        }
        match self.kind() {
            ErrorKind::ParseFailure => "could not extract text from the PDF",
            ErrorKind::EmptyResult => "no extractable text found in the PDF",
            ErrorKind::AuthFailure => "analysis service rejected our credentials",
            ErrorKind::QuotaExceeded => "analysis service quota exceeded, try again later",
            ErrorKind::ServiceUnavailable => "analysis service unavailable",
            ErrorKind::UnexpectedResponseShape => {
                "analysis service returned an unexpected response"
            }
            ErrorKind::MalformedReply => "analysis response could not be parsed",
            ErrorKind::InvalidInput => "invalid input",
        }
        .to_string()
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Normalize(e) => {
                warn!(kind = %self.kind(), status = status.as_u16(), error = %e, raw = %e.raw(), "request failed")
            }
            _ => warn!(kind = %self.kind(), status = status.as_u16(), error = %self, "request failed"),
        }
        let body = ErrorBody {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_message_per_kind() {
        let cases: Vec<(PipelineError, u16, &str)> = vec![
            (
                InvalidInput::TooLarge {
                    size: 15 * MIB,
                    max: 10 * MIB,
                }
                .into(),
                413,
                "file too large (maximum 10 MB)",
            ),
            (
                InvalidInput::TooLarge {
                    size: MIB,
                    max: 512 * 1024,
                }
                .into(),
                413,
                "file too large (maximum 1 MB)",
            ),
            (InvalidInput::MissingFile.into(), 400, "no file provided"),
            (
                ExtractError::InvalidInput(InvalidInput::UnsupportedMediaType("image/png".into()))
                    .into(),
                400,
                "file is not a PDF",
            ),
            (InvalidInput::NoText.into(), 400, "no text provided"),
            (
                ExtractError::ParseFailure("xref".into()).into(),
                422,
                "could not extract text from the PDF",
            ),
            (
                ExtractError::EmptyResult.into(),
                422,
                "no extractable text found in the PDF",
            ),
            (
                AnalysisError::AuthFailure("bad key".into()).into(),
                502,
                "analysis service rejected our credentials",
            ),
            (
                AnalysisError::QuotaExceeded {
                    message: "exhausted".into(),
                    retry_after_secs: None,
                }
                .into(),
                503,
                "analysis service quota exceeded, try again later",
            ),
            (
                AnalysisError::ServiceUnavailable("timeout".into()).into(),
                503,
                "analysis service unavailable",
            ),
            (
                AnalysisError::UnexpectedResponseShape("no candidates".into()).into(),
                502,
                "analysis service returned an unexpected response",
            ),
            (
                NormalizeError::NotAnObject {
                    raw: "[1]".into(),
                }
                .into(),
                502,
                "analysis response could not be parsed",
            ),
        ];

        for (err, status, message) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err}");
            assert_eq!(err.user_message(), message, "{err}");
        }
    }

    #[test]
    fn message_hides_raw_reply() {
        let err: PipelineError = NormalizeError::MissingClassification {
            raw: "secret contract text".into(),
        }
        .into();
        assert!(!err.user_message().contains("secret"));
        assert_eq!(err.kind(), ErrorKind::MalformedReply);
    }
}
