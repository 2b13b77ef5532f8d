//! Gateway error types

use thiserror::Error;

/// Backend call failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    /// Transport-level description of the failure
    pub message: String,
    /// `message` field of the backend's error body, when it sent one
    pub backend_message: Option<String>,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            backend_message: None,
            status: None,
        }
    }

    pub fn with_backend_message(mut self, message: impl Into<String>) -> Self {
        self.backend_message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::ServerError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unknown, message)
    }

    /// Text shown to the user: the backend's own message first, then the
    /// transport message, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| Some(self.message.as_str()).filter(|m| !m.is_empty()))
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Connection refused, reset, DNS failure
    Network,
    /// No response within the configured timeout
    Timeout,
    /// Backend answered 5xx
    ServerError,
    /// Backend answered 4xx
    InvalidRequest,
    /// Response body could not be decoded
    Decode,
    Unknown,
}
