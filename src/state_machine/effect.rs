//! Effects produced by state transitions

use super::message::MessageId;
use crate::gateway::{ChatRequest, ReminderRequest};
use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the chat endpoint; the reply comes back as `ChatResponse`/`ChatFailed`
    RequestChat {
        generation: u64,
        request: ChatRequest,
    },

    /// Call the reminder endpoint
    RequestReminder {
        generation: u64,
        request: ReminderRequest,
    },

    /// Cancel any pending reminder timer, then start one for `message_id`
    ArmReminder { message_id: MessageId, delay: Duration },

    /// Cancel any pending reminder timer
    DisarmReminder,

    /// Transcript or derived views changed
    NotifyTranscript,

    /// A chat request failed visibly
    NotifyError { message: String },
}

impl Effect {
    pub fn request_chat(
        generation: u64,
        message: impl Into<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Effect::RequestChat {
            generation,
            request: ChatRequest {
                message: message.into(),
                conversation_id,
            },
        }
    }

    pub fn request_reminder(
        generation: u64,
        conversation_id: Option<String>,
        last_assistant_message: impl Into<String>,
    ) -> Self {
        Effect::RequestReminder {
            generation,
            request: ReminderRequest {
                conversation_id,
                last_assistant_message: Some(last_assistant_message.into()),
            },
        }
    }
}
