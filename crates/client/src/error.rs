//! Error types for the client crate.

use fintrack_core::errors::{Error as CoreError, GatewayError};
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the Fintrack API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Authentication error (missing or malformed token)
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ClientError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::WebSocket(err.to_string())
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status: 401, .. } | ClientError::Auth(_) => {
                GatewayError::Unauthorized
            }
            ClientError::Api { status, message } => GatewayError::http(status, message),
            ClientError::Http(e) if e.is_decode() => GatewayError::decode(e.to_string()),
            ClientError::Http(e) => match e.status() {
                Some(status) => GatewayError::http(status.as_u16(), e.to_string()),
                None => GatewayError::network(e.to_string()),
            },
            ClientError::Json(e) => GatewayError::decode(e.to_string()),
            ClientError::WebSocket(message) => GatewayError::network(message),
        }
    }
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        CoreError::Gateway(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_gateway_unauthorized() {
        let err: GatewayError = ClientError::api(401, "Not authenticated").into();
        assert_eq!(err, GatewayError::Unauthorized);
    }

    #[test]
    fn test_api_error_keeps_status_and_message() {
        let err: CoreError = ClientError::api(422, "Insufficient funds").into();
        assert_eq!(err.user_message(), "Insufficient funds");
        assert!(matches!(
            err,
            CoreError::Gateway(GatewayError::Http { status: 422, .. })
        ));
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: GatewayError = ClientError::from(json_err).into();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
