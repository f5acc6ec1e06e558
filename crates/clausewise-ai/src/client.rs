//! The seam between the pipeline and the reasoning service.

use std::sync::Arc;

use async_trait::async_trait;
use clausewise_core::ErrorKind;
use thiserror::Error;

use crate::prompt::AnalysisRequest;

/// Raw reply text from the reasoning service, exactly as received.
///
/// Untrusted: the only way to get a [`ContractRecord`] out of it is
/// [`normalize`](crate::normalize).
///
/// [`ContractRecord`]: clausewise_core::ContractRecord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReply(String);

impl AnalysisReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("credentials rejected: {0}")]
    AuthFailure(String),

    #[error("quota exceeded: {message}")]
    QuotaExceeded {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    /// Any other 4xx: the service understood the call and refused it.
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthFailure(_) => ErrorKind::AuthFailure,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::UnexpectedResponseShape(_) | Self::Rejected { .. } => {
                ErrorKind::UnexpectedResponseShape
            }
        }
    }
}

/// Sends a built request to a reasoning service and returns the reply verbatim.
///
/// Implementations own credentials, model selection and the per-call timeout.
/// They never retry: a repeated call costs money and the caller decides.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, AnalysisError>;

    /// Model identifier, for logs and health output.
    fn model(&self) -> &str;
}

#[async_trait]
impl<C: AnalysisClient + ?Sized> AnalysisClient for Arc<C> {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, AnalysisError> {
        (**self).analyze(request).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
