use thiserror::Error;

/// Errors from the upstream TMDB client and the proxy client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Missing TMDB_API_KEY on server.")]
    MissingKey,
}

impl ApiError {
    /// The text to show a user for this failure.
    ///
    /// A message supplied by the server wins; transport failures get
    /// `network`; everything else gets `fallback`.
    pub fn user_message(&self, fallback: &str, network: &str) -> String {
        match self {
            Self::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Http(e) if !e.is_decode() => network.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Api {
            status: 502,
            message: "Invalid API key".into(),
        };
        assert_eq!(err.user_message("fallback", "network"), "Invalid API key");
    }

    #[test]
    fn test_user_message_blank_falls_back() {
        let err = ApiError::Api {
            status: 500,
            message: "  ".into(),
        };
        assert_eq!(err.user_message("fallback", "network"), "fallback");
        assert_eq!(
            ApiError::Parse("eof".into()).user_message("fallback", "network"),
            "fallback"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::get(format!("http://{addr}/"))
            .await
            .map(|_| ())
            .map_err(ApiError::from)
            .unwrap_err();

        assert!(matches!(err, ApiError::Http(_)));
        assert_eq!(err.user_message("fallback", "network"), "network");
    }
}
