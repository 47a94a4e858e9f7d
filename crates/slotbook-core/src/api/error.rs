use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transport::TransportError;
use crate::auth::CredentialStoreError;

/// Message used when an error response carries no usable body
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

/// Maximum length for error response bodies in log messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// One failed field check from the server's request validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub received: Option<String>,
    #[serde(default)]
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl ValidationIssue {
    /// Dotted field path, e.g. `variations.0.price`.
    pub fn field(&self) -> String {
        self.path
            .iter()
            .map(|segment| match segment {
                PathSegment::Key(key) => key.clone(),
                PathSegment::Index(index) => index.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
}

/// Error payload returned by the API: `{"error": "..."}` or
/// `{"error": [<validation issue>, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

impl ErrorBody {
    pub fn fallback() -> Self {
        Self {
            error: ErrorDetail::Message(FALLBACK_ERROR_MESSAGE.to_string()),
        }
    }

    /// Parse an error response body, falling back to the generic message.
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|_| Self::fallback())
    }

    pub fn message(&self) -> &str {
        match &self.error {
            ErrorDetail::Message(message) => message,
            ErrorDetail::Validation(_) => "Validation error",
        }
    }

    pub fn validation_issues(&self) -> &[ValidationIssue] {
        match &self.error {
            ErrorDetail::Validation(issues) => issues,
            ErrorDetail::Message(_) => &[],
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("{} (status {status})", .body.message())]
    Http { status: StatusCode, body: ErrorBody },

    #[error("Session expired - please log in again")]
    AuthExpired,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Credential storage error: {0}")]
    CredentialStore(#[from] CredentialStoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// User-facing message: the server's own message for HTTP failures.
    pub fn message(&self) -> String {
        match self {
            ApiError::Http { body, .. } => body.message().to_string(),
            other => other.to_string(),
        }
    }

    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &[u8]) -> String {
        let text = String::from_utf8_lossy(body);
        if text.len() <= MAX_ERROR_BODY_LENGTH {
            text.into_owned()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &text[..end], text.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_body() {
        let body = ErrorBody::parse(br#"{"error": "Email already registered"}"#);
        assert_eq!(body.message(), "Email already registered");
        assert!(body.validation_issues().is_empty());
    }

    #[test]
    fn test_parse_validation_body() {
        let body = ErrorBody::parse(
            br#"{"error": [{
                "code": "invalid_type",
                "expected": "number",
                "received": "string",
                "path": ["variations", 0, "price"],
                "message": "Expected number, received string"
            }]}"#,
        );
        assert_eq!(body.message(), "Validation error");
        let issues = body.validation_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field(), "variations.0.price");
        assert_eq!(issues[0].expected.as_deref(), Some("number"));
    }

    #[test]
    fn test_unparsable_body_uses_fallback() {
        assert_eq!(ErrorBody::parse(b"<html>Bad Gateway</html>"), ErrorBody::fallback());
        assert_eq!(ErrorBody::parse(b""), ErrorBody::fallback());
        assert_eq!(ErrorBody::parse(br#"{"message": "nope"}"#).message(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_status_helpers() {
        let err = ApiError::Http {
            status: StatusCode::CONFLICT,
            body: ErrorBody::fallback(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.message(), FALLBACK_ERROR_MESSAGE);
        assert_eq!(ApiError::AuthExpired.status(), None);
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(long.as_bytes());
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated, 510 total bytes"));
        assert_eq!(ApiError::truncate_body(b"short"), "short");
    }
}
