//! Error types for StarLine client operations
//!
//! Only hard failures end up here. Rejected credentials, non-200 statuses and
//! unexpected response bodies are reported through the empty result of the
//! operation instead (see [`crate::StarlineClient`]).

use thiserror::Error;

/// Result type alias for StarLine client operations
pub type Result<T> = std::result::Result<T, StarlineError>;

/// Errors that can occur during StarLine client operations
#[derive(Error, Debug)]
pub enum StarlineError {
    /// HTTP request failed (DNS, connect, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Caller passed values an operation refuses to send
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Failure reported by a non-reqwest transport
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl StarlineError {
    /// Create a transport error from any message
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_params_display() {
        let err = StarlineError::InvalidParams("Incorrect param values.".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid parameters: Incorrect param values."
        );
    }

    #[test]
    fn test_url_error_converts() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: StarlineError = parse_err.into();
        assert!(matches!(err, StarlineError::InvalidUrl(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StarlineError>();
    }
}
