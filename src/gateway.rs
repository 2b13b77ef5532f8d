//! Dialogue backend abstraction
//!
//! Provides a common interface for the two backend calls the chat makes.

mod error;
mod http;
mod types;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::HttpGateway;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the dialogue backend
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send one user message, receive the assistant's reply
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError>;

    /// Ask for a nudge after the user went quiet
    async fn reminder(&self, request: &ReminderRequest) -> Result<ReminderResponse, GatewayError>;
}

#[async_trait]
impl<T: ChatGateway + ?Sized> ChatGateway for Arc<T> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        (**self).chat(request).await
    }

    async fn reminder(&self, request: &ReminderRequest) -> Result<ReminderResponse, GatewayError> {
        (**self).reminder(request).await
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway<G> {
    inner: G,
}

impl<G: ChatGateway> LoggingGateway<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: ChatGateway> ChatGateway for LoggingGateway<G> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.chat(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    conversation_id = ?response.conversation_id,
                    phase = ?response.phase,
                    duration_ms = %duration.as_millis(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    conversation_id = ?request.conversation_id,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    async fn reminder(&self, request: &ReminderRequest) -> Result<ReminderResponse, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.reminder(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    conversation_id = ?request.conversation_id,
                    duration_ms = %duration.as_millis(),
                    "Reminder request completed"
                );
            }
            Err(e) => {
                // Reminder failures never reach the user
                tracing::debug!(
                    conversation_id = ?request.conversation_id,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Reminder request failed"
                );
            }
        }

        result
    }
}
