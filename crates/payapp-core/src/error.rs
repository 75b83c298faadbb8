//! Error types for PayApp integration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::PayAppErrorCode;

/// PayApp error
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form-encoded body could not be decoded
    #[error("Form decode error: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feedback failed validation
    #[error("Invalid feedback: {0}")]
    InvalidFeedback(#[from] FeedbackError),

    /// PayApp API returned an error response
    #[error("PayApp API error: {0}")]
    Api(#[from] PayAppApiError),
}

impl Error {
    /// Check if this error was reported by PayApp itself
    pub fn is_payapp_error(&self) -> bool {
        matches!(self, Error::Api(_))
    }

    /// Map this error onto the message table code
    pub fn code(&self) -> PayAppErrorCode {
        match self {
            Error::Api(e) => e.code(),
            Error::Reqwest(e) if e.status().is_some_and(|s| s.is_server_error()) => {
                PayAppErrorCode::ServerError
            }
            Error::Reqwest(e) if e.is_status() => PayAppErrorCode::Unknown,
            Error::Reqwest(_) => PayAppErrorCode::NetworkError,
            Error::InvalidFeedback(_) => PayAppErrorCode::InvalidFeedback,
            _ => PayAppErrorCode::Unknown,
        }
    }

    /// Message suitable for end users
    ///
    /// Uses the table message for known codes. PayApp errors with an
    /// unrecognised `errno` fall back to PayApp's own `errorMessage`.
    pub fn message(&self) -> &str {
        match self {
            Error::Api(e) => e.display_message(),
            other => other.code().message(),
        }
    }
}

/// Error response from the PayApp REST endpoint
///
/// PayApp answers every command with a form-encoded body. A `state` other
/// than `1` indicates failure:
///
/// ```text
/// state=0&errorMessage=...&errno=...
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Error)]
#[error("{message}")]
pub struct PayAppApiError {
    /// Result state (`0` on failure)
    pub state: String,
    /// Human-readable error message from PayApp
    #[serde(rename = "errorMessage", default)]
    pub message: String,
    /// Error number, when PayApp supplies one
    #[serde(default)]
    pub errno: Option<String>,
}

impl PayAppApiError {
    /// Get the error code
    ///
    /// Only an `errno` equal to one of the [`PAYAPP_ERROR_MESSAGES`] keys is
    /// recognised. PayApp's numeric error numbers map to
    /// [`PayAppErrorCode::Unknown`]; use [`display_message`](Self::display_message)
    /// to keep PayApp's own message in that case.
    ///
    /// [`PAYAPP_ERROR_MESSAGES`]: crate::messages::PAYAPP_ERROR_MESSAGES
    pub fn code(&self) -> PayAppErrorCode {
        self.errno
            .as_deref()
            .and_then(|errno| errno.parse().ok())
            .unwrap_or(PayAppErrorCode::Unknown)
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Table message for a known code, otherwise PayApp's `errorMessage`
    pub fn display_message(&self) -> &str {
        match self.code() {
            PayAppErrorCode::Unknown if !self.message.trim().is_empty() => &self.message,
            code => code.message(),
        }
    }
}

/// Reasons a feedback notification is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeedbackError {
    /// `userid` does not match the merchant
    #[error("user id mismatch")]
    UserIdMismatch,
    /// `linkkey` does not match the merchant
    #[error("link key mismatch")]
    LinkKeyMismatch,
    /// `linkval` does not match the merchant
    #[error("link value mismatch")]
    LinkValMismatch,
    /// `var2` is absent while a feedback secret is configured
    #[error("missing feedback key")]
    MissingFeedbackKey,
    /// `var2` does not match the expected feedback key
    #[error("feedback key mismatch")]
    FeedbackKeyMismatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DEFAULT_ERROR_MESSAGE;

    #[test]
    fn test_api_error_from_form() {
        let error: PayAppApiError =
            serde_urlencoded::from_str("state=0&errorMessage=bad+seller&errno=INVALID_USERID")
                .unwrap();

        assert_eq!(error.state, "0");
        assert_eq!(error.message, "bad seller");
        assert_eq!(error.code(), PayAppErrorCode::InvalidUserId);
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_api_error_unknown_errno() {
        let error: PayAppApiError =
            serde_urlencoded::from_str("state=0&errorMessage=oops&errno=70123").unwrap();

        assert_eq!(error.code(), PayAppErrorCode::Unknown);
        assert_eq!(error.to_string(), "oops");
        assert_eq!(error.display_message(), "oops");
        assert_eq!(Error::Api(error).message(), "oops");
    }

    #[test]
    fn test_api_error_display_message() {
        let known: PayAppApiError =
            serde_urlencoded::from_str("state=0&errorMessage=raw&errno=ALREADY_CANCELLED")
                .unwrap();
        assert_eq!(
            known.display_message(),
            PayAppErrorCode::AlreadyCancelled.message()
        );

        let blank: PayAppApiError =
            serde_urlencoded::from_str("state=0&errorMessage=&errno=70123").unwrap();
        assert_eq!(blank.display_message(), DEFAULT_ERROR_MESSAGE);

        let config = Error::Config("missing user id".to_string());
        assert_eq!(config.message(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_error_code_mapping() {
        let api = Error::Api(PayAppApiError {
            state: "0".to_string(),
            message: "server busy".to_string(),
            errno: Some("SERVER_ERROR".to_string()),
        });
        assert!(api.is_payapp_error());
        assert_eq!(api.code(), PayAppErrorCode::ServerError);

        let feedback = Error::from(FeedbackError::LinkKeyMismatch);
        assert!(!feedback.is_payapp_error());
        assert_eq!(feedback.code(), PayAppErrorCode::InvalidFeedback);

        let config = Error::Config("missing user id".to_string());
        assert_eq!(config.code(), PayAppErrorCode::Unknown);
    }
}
