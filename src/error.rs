use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Missing API credential")]
    MissingCredential,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No user message in conversation history")]
    NoUserMessage,

    #[error("Invalid media encoding: {0}")]
    InvalidMediaEncoding(String),

    #[error("Upstream error from {model}: {detail}")]
    Upstream { model: String, detail: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingCredential => StatusCode::UNAUTHORIZED,
            RelayError::InvalidRequest(_)
            | RelayError::NoUserMessage
            | RelayError::InvalidMediaEncoding(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn status_label(&self) -> &'static str {
        match self.status_code().as_u16() {
            401 => "UNAUTHENTICATED",
            400 => "INVALID_ARGUMENT",
            502 => "UNAVAILABLE",
            _ => "INTERNAL",
        }
    }
}

/// Errors surface to callers as Gemini-style structured JSON bodies.
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "status": self.status_label(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
