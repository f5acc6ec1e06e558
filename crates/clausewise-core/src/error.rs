//! Failure taxonomy shared by every pipeline stage.

use std::fmt;

use serde::Serialize;

/// The kind of failure a pipeline stage reports.
///
/// Each stage keeps its own error type; this is the common vocabulary the
/// boundary uses to pick a status code and a user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    // Extraction
    InvalidInput,
    ParseFailure,
    EmptyResult,
    // Remote call
    AuthFailure,
    QuotaExceeded,
    ServiceUnavailable,
    UnexpectedResponseShape,
    // Normalization
    MalformedReply,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::ParseFailure => "parse_failure",
            Self::EmptyResult => "empty_result",
            Self::AuthFailure => "auth_failure",
            Self::QuotaExceeded => "quota_exceeded",
            Self::ServiceUnavailable => "service_unavailable",
            Self::UnexpectedResponseShape => "unexpected_response_shape",
            Self::MalformedReply => "malformed_reply",
        }
    }

    /// Whether a later attempt with the same input could succeed.
    ///
    /// Retrying is the caller's decision; no stage retries on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::QuotaExceeded | Self::ServiceUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_remote_capacity_failures_are_transient() {
        assert!(ErrorKind::ServiceUnavailable.is_transient());
        assert!(ErrorKind::QuotaExceeded.is_transient());
        assert!(!ErrorKind::ParseFailure.is_transient());
        assert!(!ErrorKind::MalformedReply.is_transient());
        assert!(!ErrorKind::AuthFailure.is_transient());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UnexpectedResponseShape).unwrap();
        assert_eq!(json, "\"unexpected_response_shape\"");
        assert_eq!(ErrorKind::EmptyResult.to_string(), "empty_result");
    }
}
