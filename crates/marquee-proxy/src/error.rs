use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use marquee_api::ApiError;

/// Failures surfaced to proxy callers as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid movie id.")]
    InvalidId,

    /// Upstream answered with a failure status.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    /// Classify an upstream client error.
    ///
    /// Failure statuses become 502 with TMDB's own message, or `fallback`
    /// when it sent none. Anything that never produced a status (missing
    /// key, transport, unreadable body) is internal.
    pub fn from_upstream(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Api { message, .. } if message.trim().is_empty() => {
                Self::Upstream(fallback.to_string())
            }
            ApiError::Api { message, .. } => Self::Upstream(message),
            other => Self::Internal(other.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), "{self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_or_fallback() {
        let err = ProxyError::from_upstream(
            ApiError::Api {
                status: 401,
                message: "Invalid API key: You must be granted a valid key.".into(),
            },
            "TMDB search failed.",
        );
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.to_string(),
            "Invalid API key: You must be granted a valid key."
        );

        let err = ProxyError::from_upstream(
            ApiError::Api {
                status: 500,
                message: String::new(),
            },
            "TMDB search failed.",
        );
        assert_eq!(err.to_string(), "TMDB search failed.");
    }

    #[test]
    fn test_missing_key_is_internal() {
        let err = ProxyError::from_upstream(ApiError::MissingKey, "TMDB details failed.");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Missing TMDB_API_KEY on server.");
    }
}
