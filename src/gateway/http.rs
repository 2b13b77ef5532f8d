//! HTTP/JSON gateway to the dialogue backend

use super::error::GatewayError;
use super::types::{ChatRequest, ChatResponse, ReminderRequest, ReminderResponse};
use super::ChatGateway;
use crate::config::ChatConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Talks to `{base}/chat` and `{base}/chat/reminder`
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::unknown(format!("Failed to create HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self, GatewayError> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    fn reminder_url(&self) -> String {
        format!("{}/chat/reminder", self.base_url)
    }

    async fn post_json<Req, Resp>(&self, url: &str, body: &Req) -> Result<Resp, GatewayError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(url, status, &body));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| GatewayError::decode(format!("Invalid response from {url}: {e}")))
    }
}

#[async_trait]
impl ChatGateway for HttpGateway {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        self.post_json(&self.chat_url(), request).await
    }

    async fn reminder(&self, request: &ReminderRequest) -> Result<ReminderResponse, GatewayError> {
        self.post_json(&self.reminder_url(), request).await
    }
}

fn transport_error(url: &str, e: &reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::timeout(format!("Request to {url} timed out"))
    } else if e.is_decode() {
        GatewayError::decode(format!("Invalid response from {url}: {e}"))
    } else {
        GatewayError::network(format!("Http failure response for {url}: {e}"))
    }
}

fn status_error(url: &str, status: StatusCode, body: &str) -> GatewayError {
    let message = format!("Http failure response for {url}: {status}");
    let error = match status.as_u16() {
        400..=499 => GatewayError::invalid_request(message),
        500..=599 => GatewayError::server_error(message),
        _ => GatewayError::unknown(message),
    }
    .with_status(status.as_u16());

    match backend_message(body) {
        Some(m) => error.with_backend_message(m),
        None => error,
    }
}

/// `message` string from a JSON error body
fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
