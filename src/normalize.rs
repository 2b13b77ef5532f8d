//! Canonical forms for backend-supplied options, input types, and text
//!
//! Everything here is pure and total: malformed input degrades to a default
//! instead of failing.

use crate::gateway::RawOption;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Input widget hint for the next user answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Tel,
    Email,
    Number,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Tel => "tel",
            InputType::Email => "email",
            InputType::Number => "number",
        }
    }

    /// Exact tag match only; no case folding or trimming
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(InputType::Text),
            "tel" => Some(InputType::Tel),
            "email" => Some(InputType::Email),
            "number" => Some(InputType::Number),
            _ => None,
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quick-reply labels in backend order, trimmed, empties dropped
pub fn normalize_options(raw: Option<&[RawOption]>) -> Vec<String> {
    raw.unwrap_or_default()
        .iter()
        .map(option_text)
        .filter(|s| !s.is_empty())
        .collect()
}

fn option_text(option: &RawOption) -> String {
    let text = match option {
        RawOption::Text(s) => s.clone(),
        // An empty label still wins over the value
        RawOption::Record { label, value } => label
            .as_ref()
            .or(value.as_ref())
            .map(coerce_to_string)
            .unwrap_or_default(),
        RawOption::Other(v) => coerce_to_string(v),
    };
    trim_text(&text).to_string()
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Validated input type; anything unrecognised becomes `Text`
pub fn normalize_input_type(raw: Option<&str>) -> InputType {
    raw.and_then(InputType::from_tag).unwrap_or_default()
}

/// Trim whitespace and byte order marks from both ends
pub fn trim_text(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

const SMART_OPEN: char = '\u{201C}';
const SMART_CLOSE: char = '\u{201D}';

/// Strip one layer of wrapping quotes from backend text.
///
/// Text that is not quote-wrapped (after trimming) is returned untouched,
/// surrounding whitespace included. Plain double quotes are decoded as a JSON
/// string literal when possible so escapes are honoured; otherwise the first
/// and last characters are dropped.
pub fn normalize_message_text(raw: &str) -> String {
    let trimmed = trim_text(raw);
    if trimmed.chars().count() < 2 {
        return raw.to_string();
    }

    let quoted = trimmed.starts_with('"') && trimmed.ends_with('"');
    let smart_quoted = trimmed.starts_with(SMART_OPEN) && trimmed.ends_with(SMART_CLOSE);
    if !quoted && !smart_quoted {
        return raw.to_string();
    }

    if quoted {
        if let Ok(parsed) = serde_json::from_str::<String>(trimmed) {
            return parsed;
        }
    }

    strip_outer(trimmed).to_string()
}

fn strip_outer(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}
