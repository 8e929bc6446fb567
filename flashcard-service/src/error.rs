use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const MISSING_API_KEY_MESSAGE: &str = "Server API Key is missing";
pub const INVALID_API_KEY_MESSAGE: &str = "Server API Key is invalid or expired";
pub const QUOTA_MESSAGE: &str = "AI service quota exceeded. Please try again later.";
pub const FORMAT_ERROR_MESSAGE: &str = "AI output format error";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";

/// Failures on the flashcard request path.
///
/// Every variant renders as `{"error": "..."}`. Provider failures are
/// classified by their message text, since upstream quota and credential
/// problems only surface as text. Parse errors are never classified: their
/// line/column positions can contain "429".
#[derive(Debug, Error)]
pub enum FlashcardError {
    #[error("{}", MISSING_API_KEY_MESSAGE)]
    MissingApiKey,

    #[error("{}", METHOD_NOT_ALLOWED_MESSAGE)]
    MethodNotAllowed,

    #[error("{}", FORMAT_ERROR_MESSAGE)]
    OutputFormat,

    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("invalid flashcard JSON: {0}")]
    CardParse(#[source] serde_json::Error),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// What the caller is told about an error, derived from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Quota,
    InvalidApiKey,
    Other,
}

pub fn classify_error_text(text: &str) -> ErrorClass {
    let lower = text.to_lowercase();
    if lower.contains("quota") || lower.contains("429") || lower.contains("rate limit") {
        ErrorClass::Quota
    } else if text.contains("API key not valid") {
        ErrorClass::InvalidApiKey
    } else {
        ErrorClass::Other
    }
}

impl FlashcardError {
    /// Status code and caller-facing message.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            FlashcardError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                MISSING_API_KEY_MESSAGE.to_string(),
            ),
            FlashcardError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            ),
            FlashcardError::OutputFormat => (
                StatusCode::INTERNAL_SERVER_ERROR,
                FORMAT_ERROR_MESSAGE.to_string(),
            ),
            FlashcardError::BodyRead(_)
            | FlashcardError::InvalidBody(_)
            | FlashcardError::CardParse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server Error: {}", self),
            ),
            FlashcardError::Provider(err) => {
                let text = err.to_string();
                match classify_error_text(&text) {
                    ErrorClass::Quota => (StatusCode::TOO_MANY_REQUESTS, QUOTA_MESSAGE.to_string()),
                    ErrorClass::InvalidApiKey => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        INVALID_API_KEY_MESSAGE.to_string(),
                    ),
                    ErrorClass::Other => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Server Error: {}", text),
                    ),
                }
            }
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FlashcardError::MissingApiKey => "missing_api_key",
            FlashcardError::MethodNotAllowed => "method_not_allowed",
            FlashcardError::OutputFormat => "output_format",
            FlashcardError::BodyRead(_) => "body_read",
            FlashcardError::InvalidBody(_) => "invalid_body",
            FlashcardError::CardParse(_) => "card_parse",
            FlashcardError::Provider(e) => e.kind(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for FlashcardError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}
