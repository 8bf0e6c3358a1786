use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use guides_editor::EditError;

/// Errors that can occur when running the guide server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be read.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A response could not be built.
    #[error("internal error: {0}")]
    Internal(String),

    /// A session token could not be minted.
    #[error("session error: {0}")]
    Session(String),

    /// The edit workflow failed.
    #[error(transparent)]
    Edit(#[from] EditError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Edit(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.user_message()),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) | Self::Session(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_are_server_side() {
        let response = ServerError::Internal("flash encoding failed".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_requests_are_client_side() {
        let response = ServerError::BadRequest("truncated multipart body".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
