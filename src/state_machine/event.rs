//! Events that can occur in a chat

use super::message::MessageId;
use crate::gateway::{ChatResponse, GatewayError, ReminderResponse};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    InputChanged {
        text: String,
    },
    /// Send whatever is in the input buffer
    SendInput,
    UserMessage {
        text: String,
    },
    QuickReply {
        option: String,
    },
    NewSession,

    // Backend events, tagged with the generation that issued the request
    ChatResponse {
        generation: u64,
        response: ChatResponse,
    },
    ChatFailed {
        generation: u64,
        error: GatewayError,
    },

    // Reminder events
    ReminderDue {
        message_id: MessageId,
    },
    ReminderResponse {
        generation: u64,
        response: ReminderResponse,
    },
    ReminderFailed {
        generation: u64,
    },
}

impl Event {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::InputChanged { .. } => "input_changed",
            Event::SendInput => "send_input",
            Event::UserMessage { .. } => "user_message",
            Event::QuickReply { .. } => "quick_reply",
            Event::NewSession => "new_session",
            Event::ChatResponse { .. } => "chat_response",
            Event::ChatFailed { .. } => "chat_failed",
            Event::ReminderDue { .. } => "reminder_due",
            Event::ReminderResponse { .. } => "reminder_response",
            Event::ReminderFailed { .. } => "reminder_failed",
        }
    }
}
