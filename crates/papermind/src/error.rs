//! Error types for the analysis service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Analysis service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (bad tunables, bad addresses)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persona input could not be read or parsed
    #[error("Invalid persona input: {0}")]
    Persona(String),

    /// Document parsing error
    #[error("Failed to parse document '{filename}': {message}")]
    DocumentParse { filename: String, message: String },

    /// Collection directory does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Relevance backend failed for the whole invocation
    #[error("Relevance backend error: {0}")]
    Backend(String),

    /// Invocation exceeded its deadline; no partial result is produced
    #[error("Analysis timed out after {0}s")]
    Timeout(u64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a document parse error
    pub fn document_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::Persona(msg) => (StatusCode::BAD_REQUEST, "persona_error", msg.clone()),
            Error::DocumentParse { filename, message } => (
                StatusCode::BAD_REQUEST,
                "parse_error",
                format!("Failed to parse '{}': {}", filename, message),
            ),
            Error::CollectionNotFound(name) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Collection not found: {}", name),
            ),
            Error::Backend(msg) => (StatusCode::BAD_GATEWAY, "backend_error", msg.clone()),
            Error::Timeout(secs) => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                format!("Analysis timed out after {}s", secs),
            ),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
