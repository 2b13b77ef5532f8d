//! Environment configuration

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_REMINDER_DELAY: Duration = Duration::from_secs(30);

const API_URL_VAR: &str = "ADVISOR_API_URL";
const REQUEST_TIMEOUT_VAR: &str = "ADVISOR_REQUEST_TIMEOUT_SECS";
const REMINDER_DELAY_VAR: &str = "ADVISOR_REMINDER_DELAY_SECS";

/// Runtime settings for the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL; `/chat` and `/chat/reminder` are appended
    pub api_url: String,
    pub request_timeout: Duration,
    /// Idle time after an assistant turn before a reminder is requested
    pub reminder_delay: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reminder_delay: DEFAULT_REMINDER_DELAY,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset, blank or unparsable
    /// values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup(API_URL_VAR)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        let request_timeout = parse_secs(lookup(REQUEST_TIMEOUT_VAR))
            .filter(|d| !d.is_zero())
            .unwrap_or(defaults.request_timeout);

        let reminder_delay =
            parse_secs(lookup(REMINDER_DELAY_VAR)).unwrap_or(defaults.reminder_delay);

        Self {
            api_url,
            request_timeout,
            reminder_delay,
        }
    }
}

fn parse_secs(raw: Option<String>) -> Option<Duration> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!(value = %raw, error = %e, "Ignoring invalid duration setting");
            None
        }
    }
}
