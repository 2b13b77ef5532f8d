//! Chat session state

use super::message::{ChatMessage, IdGenerator, MessageId, UuidIds};
use crate::config::{ChatConfig, DEFAULT_REMINDER_DELAY};
use crate::gateway::ChatResponse;
use crate::normalize::{trim_text, InputType};
use crate::offers::{self, OfferCard};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Phase tag the backend sends once the conversation is over
pub const TERMINAL_PHASE: &str = "DONE";

pub const INITIAL_PROMPT: &str = "Bonjour ! En 30 secondes, nous voyons si on peut baisser vos \
cotisations ou améliorer vos garanties.\nQuelle est votre priorité ?";

pub const INITIAL_OPTIONS: [&str; 2] = [
    "Faire baisser les cotisations",
    "Améliorer/optimiser les garanties",
];

/// Shown when a successful reply carries no text
pub const EMPTY_REPLY_PLACEHOLDER: &str = "(Aucune réponse du serveur)";

/// Used when a failed request yields no usable message at all
pub const REQUEST_FAILED_FALLBACK: &str =
    "Échec de la requête. Vérifiez les logs backend et la config proxy.";

pub const ERROR_BUBBLE_PREFIX: &str = "Erreur : ";

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for user input
    #[default]
    Idle,
    /// A chat request is in flight
    Sending,
    /// Backend reported the final phase; only a new session is accepted
    Terminal,
}

impl SessionStatus {
    /// Status to settle into once no request is in flight
    pub fn settled(terminal: bool) -> Self {
        if terminal {
            SessionStatus::Terminal
        } else {
            SessionStatus::Idle
        }
    }
}

/// Bookkeeping for the single idle-reminder timer.
///
/// The timer itself lives in the runtime; this records which assistant
/// message it watches so stale or repeated firings can be told apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderSlot {
    /// Message the pending timer is armed for
    pub armed_for: Option<MessageId>,
    /// Message a reminder has already been requested for
    pub reminded: Option<MessageId>,
}

impl ReminderSlot {
    pub fn arm(&mut self, message_id: MessageId) {
        self.armed_for = Some(message_id);
    }

    pub fn disarm(&mut self) {
        self.armed_for = None;
    }

    pub fn is_armed_for(&self, message_id: &MessageId) -> bool {
        self.armed_for.as_ref() == Some(message_id)
    }

    pub fn already_reminded(&self, message_id: &MessageId) -> bool {
        self.reminded.as_ref() == Some(message_id)
    }
}

/// Data-collection progress reported with the latest reply
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldProgress {
    pub extracted_fields: Map<String, Value>,
    pub completion_status: BTreeMap<String, bool>,
    pub all_fields_complete: bool,
}

impl FieldProgress {
    pub fn from_response(response: &ChatResponse) -> Self {
        Self {
            extracted_fields: response.extracted_fields.clone().unwrap_or_default(),
            completion_status: response.completion_status.clone().unwrap_or_default(),
            all_fields_complete: response.all_fields_complete.unwrap_or(false),
        }
    }
}

/// Everything the chat knows about the current conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatSession {
    /// Bumped on every new session; tags outbound requests
    pub generation: u64,
    pub status: SessionStatus,
    /// Assigned by the backend, reused until a new session starts
    pub conversation_id: Option<String>,
    pub phase: Option<String>,
    pub messages: Vec<ChatMessage>,
    /// Unsent text in the input box
    pub input: String,
    pub quick_replies: Vec<String>,
    pub input_type: InputType,
    /// Last visible request failure, cleared by the next send
    pub error: Option<String>,
    pub progress: FieldProgress,
    pub reminder: ReminderSlot,
}

impl ChatSession {
    pub fn is_terminal(&self) -> bool {
        self.phase.as_deref() == Some(TERMINAL_PHASE)
    }

    pub fn is_sending(&self) -> bool {
        self.status == SessionStatus::Sending
    }

    pub fn can_send(&self) -> bool {
        !trim_text(&self.input).is_empty() && !self.is_sending() && !self.is_terminal()
    }

    pub fn offer_cards_visible(&self) -> bool {
        offers::is_offer_set(&self.quick_replies)
    }

    /// Snapshot with derived flags resolved
    pub fn view(&self) -> SessionView {
        SessionView {
            generation: self.generation,
            status: self.status,
            conversation_id: self.conversation_id.clone(),
            phase: self.phase.clone(),
            messages: self.messages.clone(),
            input: self.input.clone(),
            quick_replies: self.quick_replies.clone(),
            input_type: self.input_type,
            error: self.error.clone(),
            progress: self.progress.clone(),
            sending: self.is_sending(),
            can_send: self.can_send(),
            is_terminal: self.is_terminal(),
            offer_cards: offers::offer_cards(&self.quick_replies).to_vec(),
        }
    }
}

/// Read-only copy of a session handed to observers and callers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionView {
    pub generation: u64,
    pub status: SessionStatus,
    pub conversation_id: Option<String>,
    pub phase: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub quick_replies: Vec<String>,
    pub input_type: InputType,
    pub error: Option<String>,
    pub progress: FieldProgress,
    pub sending: bool,
    pub can_send: bool,
    pub is_terminal: bool,
    /// Non-empty only when the quick replies are the offer pair
    pub offer_cards: Vec<OfferCard>,
}

impl SessionView {
    pub fn offer_cards_visible(&self) -> bool {
        !self.offer_cards.is_empty()
    }
}

/// Context for a chat (immutable configuration)
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub reminder_delay: Duration,
    pub ids: Arc<dyn IdGenerator>,
}

impl ChatContext {
    pub fn new(reminder_delay: Duration, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            reminder_delay,
            ids,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.reminder_delay, Arc::new(UuidIds))
    }

    pub fn next_id(&self) -> MessageId {
        self.ids.next_id()
    }
}

impl Default for ChatContext {
    fn default() -> Self {
        Self::new(DEFAULT_REMINDER_DELAY, Arc::new(UuidIds))
    }
}
