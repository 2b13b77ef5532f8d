//! Wire types for the dialogue backend

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Serialized as `null` until the backend has assigned one
    pub conversation_id: Option<String>,
}

/// Reply to `POST /chat`
///
/// Every field tolerates being absent, null, or of the wrong shape; callers
/// apply their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub response: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub conversation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub extracted_fields: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<BTreeMap<String, bool>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub all_fields_complete: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<RawOption>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
}

impl ChatResponse {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            ..Self::default()
        }
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = RawOption>) -> Self {
        self.options = Some(options.into_iter().collect());
        self
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }
}

/// One suggested quick reply as the backend sends it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Text(String),
    Record {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    Other(Value),
}

impl RawOption {
    pub fn text(s: impl Into<String>) -> Self {
        RawOption::Text(s.into())
    }

    pub fn labelled(label: impl Into<String>) -> Self {
        RawOption::Record {
            label: Some(Value::String(label.into())),
            value: None,
        }
    }

    pub fn valued(value: impl Into<String>) -> Self {
        RawOption::Record {
            label: None,
            value: Some(Value::String(value.into())),
        }
    }
}

/// Body of `POST /chat/reminder`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub conversation_id: Option<String>,
    pub last_assistant_message: Option<String>,
}

/// Reply to `POST /chat/reminder`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub response: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ReminderResponse {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            conversation_id: None,
        }
    }
}

/// Deserialize an optional field, mapping a wrong shape to `None` instead of failing
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
