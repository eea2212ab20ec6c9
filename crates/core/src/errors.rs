//! Core error types for the Fintrack client.
//!
//! This module defines transport-agnostic error types. Concrete clients
//! (HTTP, WebSocket) convert their own failures into these types at the
//! gateway boundary.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the client library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Gateway request failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error("Synchronizer has been torn down")]
    TornDown,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Failures reported by the remote data gateway.
///
/// The variants carry plain strings so that the core crate does not depend
/// on any particular HTTP stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The server answered with a non-success status.
    #[error("{message} (status {status})")]
    Http { status: u16, message: String },

    /// The request never produced a response (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server rejected the access token.
    #[error("Not authenticated")]
    Unauthorized,

    /// The response body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Create an HTTP error from status and message
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Http { message, .. } => message.clone(),
            GatewayError::Network(_) => "Network error. Please try again.".to_string(),
            GatewayError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            GatewayError::Decode(_) => "Unexpected response from server.".to_string(),
        }
    }
}

/// Validation errors for command payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

impl Error {
    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Gateway(err) => err.user_message(),
            Error::Validation(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
