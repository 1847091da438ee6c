//! Adapter error types

use dirsync_core::DirectoryError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, GoogleError>;

/// Errors raised while talking to Google APIs
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Transport-level failure
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Non-success HTTP status, with the API's own message when it sent one
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: StatusCode, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Service account key could not be read or used
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    /// Token endpoint refused or garbled the exchange
    #[error("Token request failed: {0}")]
    Token(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transient failures persisted past the retry budget
    #[error("Retry limit exceeded after {attempts} attempts: {last}")]
    RetryLimitExceeded {
        attempts: u32,
        last: Box<GoogleError>,
    },

    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

impl GoogleError {
    /// Network errors, 429 and 5xx are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            GoogleError::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            GoogleError::HttpStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Failures that show the request was never applied: the connection
    /// was not established, or the API rejected it before doing any work
    pub fn is_unapplied(&self) -> bool {
        match self {
            GoogleError::RequestFailed(e) => e.is_connect(),
            GoogleError::HttpStatus { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS
                    || *status == StatusCode::SERVICE_UNAVAILABLE
            }
            _ => false,
        }
    }

    /// HTTP status carried by this error, looking through retry exhaustion
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GoogleError::HttpStatus { status, .. } => Some(*status),
            GoogleError::RetryLimitExceeded { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Build a status error from a response body, preferring the API's
    /// `error.message` over the raw body
    pub(crate) fn from_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|parsed| parsed.error.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    body.trim().to_string()
                }
            });
        GoogleError::HttpStatus { status, message }
    }
}

/// `{"error": {"code": 404, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl From<GoogleError> for DirectoryError {
    fn from(error: GoogleError) -> Self {
        match error {
            GoogleError::HttpStatus { status, message } => match status {
                StatusCode::NOT_FOUND => DirectoryError::NotFound(message),
                StatusCode::CONFLICT => DirectoryError::AlreadyExists(message),
                StatusCode::UNAUTHORIZED => DirectoryError::Auth(message),
                StatusCode::FORBIDDEN => DirectoryError::PermissionDenied(message),
                StatusCode::TOO_MANY_REQUESTS => DirectoryError::RateLimited(message),
                _ => DirectoryError::Api(format!("HTTP {}: {}", status.as_u16(), message)),
            },
            GoogleError::RetryLimitExceeded { attempts, last } => {
                match DirectoryError::from(*last) {
                    DirectoryError::Api(message) => DirectoryError::Api(format!(
                        "{} (gave up after {} attempts)",
                        message, attempts
                    )),
                    other => other,
                }
            }
            GoogleError::RequestFailed(e) => DirectoryError::Network(e.to_string()),
            GoogleError::Credentials(message) | GoogleError::Token(message) => {
                DirectoryError::Auth(message)
            }
            GoogleError::InvalidResponse(message) => DirectoryError::InvalidResponse(message),
            other => DirectoryError::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, message: &str) -> GoogleError {
        GoogleError::HttpStatus {
            status: StatusCode::from_u16(code).unwrap(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DirectoryError::from(status(404, "Resource Not Found: groupKey")),
            DirectoryError::NotFound("Resource Not Found: groupKey".into())
        );
        assert!(matches!(DirectoryError::from(status(409, "x")), DirectoryError::AlreadyExists(_)));
        assert!(matches!(DirectoryError::from(status(401, "x")), DirectoryError::Auth(_)));
        assert!(matches!(
            DirectoryError::from(status(403, "x")),
            DirectoryError::PermissionDenied(_)
        ));
        assert!(matches!(DirectoryError::from(status(429, "x")), DirectoryError::RateLimited(_)));
        assert_eq!(
            DirectoryError::from(status(500, "Backend Error")),
            DirectoryError::Api("HTTP 500: Backend Error".into())
        );
    }

    #[test]
    fn test_retry_exhaustion_keeps_kind() {
        let exhausted = GoogleError::RetryLimitExceeded {
            attempts: 4,
            last: Box::new(status(429, "Quota exceeded")),
        };
        assert_eq!(exhausted.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(
            DirectoryError::from(exhausted),
            DirectoryError::RateLimited("Quota exceeded".into())
        );
    }

    #[test]
    fn test_retryable() {
        assert!(status(503, "x").is_retryable());
        assert!(status(429, "x").is_retryable());
        assert!(!status(404, "x").is_retryable());
        assert!(!GoogleError::Token("denied".into()).is_retryable());
    }

    #[test]
    fn test_unapplied() {
        assert!(status(429, "x").is_unapplied());
        assert!(status(503, "x").is_unapplied());
        assert!(!status(500, "x").is_unapplied());
        assert!(!status(502, "x").is_unapplied());
        assert!(!status(409, "x").is_unapplied());
    }

    #[test]
    fn test_body_parsing() {
        let body = r#"{"error": {"code": 404, "message": "Resource Not Found: memberKey", "errors": []}}"#;
        assert!(matches!(
            GoogleError::from_body(StatusCode::NOT_FOUND, body),
            GoogleError::HttpStatus { message, .. } if message == "Resource Not Found: memberKey"
        ));

        assert!(matches!(
            GoogleError::from_body(StatusCode::BAD_GATEWAY, ""),
            GoogleError::HttpStatus { message, .. } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn test_auth_errors_map_to_auth() {
        assert!(matches!(
            DirectoryError::from(GoogleError::Credentials("bad key".into())),
            DirectoryError::Auth(_)
        ));
    }
}
