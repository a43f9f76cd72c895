// Error types module

use std::fmt;

use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Process-level error type for the proxy
///
/// Image transformation failures never surface here: they are handled inside
/// the middleware by serving the original response.
#[derive(Debug, Clone)]
pub enum ProxyError {
    /// Configuration errors (invalid YAML, missing env vars, failed validation)
    Config(String),

    /// Origin unreachable, or its response body failed mid-stream
    Upstream(String),

    /// Internal proxy errors (bind failure, unexpected errors)
    Internal(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ProxyError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            ProxyError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Config(_) | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        // Details stay in the log; clients only get the reason phrase
        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}
