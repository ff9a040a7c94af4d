/*
[INPUT]:  Error sources (HTTP, API, signing, serialization, WebSocket, config)
[OUTPUT]: Structured error types shared by the REST and WebSocket clients
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Aevo adapter
#[derive(Error, Debug)]
pub enum AevoError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Exchange returned a non-2xx response; `message` is the raw body
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Missing or rejected API credentials
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Typed-data signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// WebSocket command issued without an open connection
    #[error("WebSocket not connected")]
    NotConnected,

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error (environment, keys, addresses, order values)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AevoError {
    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        match self {
            AevoError::Authentication { .. } => true,
            AevoError::Api { code, .. } => *code == 401 || *code == 403,
            _ => false,
        }
    }

    /// Check if the error came from the network layer rather than the exchange
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            AevoError::Http(_) | AevoError::WebSocket(_) | AevoError::NotConnected
        )
    }

    /// Create an API error from status code and response body
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        AevoError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_credentials(operation: &str) -> Self {
        AevoError::Authentication {
            message: format!("{operation} requires credentials"),
        }
    }
}

/// Result type alias for Aevo operations
pub type Result<T> = std::result::Result<T, AevoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_auth_error() {
        assert!(AevoError::missing_credentials("create_order").is_auth_error());
        assert!(AevoError::api_error(StatusCode::UNAUTHORIZED, "bad key").is_auth_error());
        assert!(!AevoError::api_error(StatusCode::BAD_REQUEST, "bad price").is_auth_error());
        assert!(!AevoError::NotConnected.is_auth_error());
    }

    #[test]
    fn test_error_is_transport_error() {
        assert!(AevoError::WebSocket("reset".to_string()).is_transport_error());
        assert!(AevoError::NotConnected.is_transport_error());
        assert!(!AevoError::Config("env".to_string()).is_transport_error());
    }

    #[test]
    fn test_api_error_creation() {
        let err = AevoError::api_error(StatusCode::BAD_REQUEST, r#"{"error":"INVALID_PRICE"}"#);
        match err {
            AevoError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, r#"{"error":"INVALID_PRICE"}"#);
            }
            _ => panic!("Expected Api error variant"),
        }
    }
}
