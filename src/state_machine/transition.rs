//! Pure state transition function

use super::message::{ChatMessage, MessageId};
use super::state::{
    ChatContext, ChatSession, FieldProgress, SessionStatus, EMPTY_REPLY_PLACEHOLDER,
    ERROR_BUBBLE_PREFIX, INITIAL_OPTIONS, INITIAL_PROMPT, REQUEST_FAILED_FALLBACK,
};
use super::{Effect, Event};
use crate::gateway::{ChatResponse, GatewayError, ReminderResponse};
use crate::normalize::{
    normalize_input_type, normalize_message_text, normalize_options, trim_text, InputType,
};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatSession,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatSession) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Why an event was not applied. None of these reach the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A message is already being sent")]
    SendInFlight,
    #[error("Conversation is finished, start a new session")]
    SessionTerminal,
    #[error("Response from generation {received} arrived after generation {current} started")]
    StaleGeneration { received: u64, current: u64 },
    #[error("Reminder for message {0} is no longer armed")]
    ReminderSuperseded(MessageId),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Input the user could legitimately retry later
    pub fn is_guard_rejection(&self) -> bool {
        matches!(
            self,
            TransitionError::EmptyMessage
                | TransitionError::SendInFlight
                | TransitionError::SessionTerminal
        )
    }
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, apart from the
/// identifiers and timestamps of newly created messages.
pub fn transition(
    session: &ChatSession,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (session.status, event) {
        // ============================================================
        // Input buffer
        // ============================================================
        (_, Event::InputChanged { text }) => {
            let mut next = session.clone();
            next.input = text;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Sending
        // ============================================================
        (
            SessionStatus::Sending,
            Event::SendInput | Event::UserMessage { .. } | Event::QuickReply { .. },
        ) => Err(TransitionError::SendInFlight),

        (
            SessionStatus::Terminal,
            Event::SendInput | Event::UserMessage { .. } | Event::QuickReply { .. },
        ) => Err(TransitionError::SessionTerminal),

        (SessionStatus::Idle, Event::SendInput) => begin_send(session, context, &session.input),

        (SessionStatus::Idle, Event::UserMessage { text }) => begin_send(session, context, &text),

        (SessionStatus::Idle, Event::QuickReply { option }) => {
            if option.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            begin_send(session, context, &option)
        }

        // ============================================================
        // Session lifecycle
        // ============================================================
        (_, Event::NewSession) => Ok(open_session(session.generation + 1, context)),

        // ============================================================
        // Chat replies
        // ============================================================
        (status, Event::ChatResponse { generation, response }) => {
            ensure_current(session, generation)?;
            if status != SessionStatus::Sending {
                return Err(TransitionError::InvalidTransition(format!(
                    "chat response while {status:?}"
                )));
            }
            Ok(apply_reply(session, context, &response))
        }

        (status, Event::ChatFailed { generation, error }) => {
            ensure_current(session, generation)?;
            if status != SessionStatus::Sending {
                return Err(TransitionError::InvalidTransition(format!(
                    "chat failure while {status:?}"
                )));
            }
            Ok(apply_failure(session, context, &error))
        }

        // ============================================================
        // Idle reminder
        // ============================================================
        (_, Event::ReminderDue { message_id }) => reminder_due(session, message_id),

        (_, Event::ReminderResponse { generation, response }) => {
            ensure_current(session, generation)?;
            Ok(apply_reminder_reply(session, context, &response))
        }

        (_, Event::ReminderFailed { generation }) => {
            ensure_current(session, generation)?;
            // Best effort: nothing to show, nothing to re-arm
            Ok(TransitionResult::new(session.clone()))
        }
    }
}

fn ensure_current(session: &ChatSession, generation: u64) -> Result<(), TransitionError> {
    if generation == session.generation {
        Ok(())
    } else {
        Err(TransitionError::StaleGeneration {
            received: generation,
            current: session.generation,
        })
    }
}

/// Fresh session: greeting, initial quick replies, reminder armed for the greeting
fn open_session(generation: u64, context: &ChatContext) -> TransitionResult {
    let greeting = ChatMessage::assistant(context.next_id(), INITIAL_PROMPT);
    let greeting_id = greeting.id.clone();

    let mut session = ChatSession {
        generation,
        messages: vec![greeting],
        quick_replies: INITIAL_OPTIONS.iter().map(ToString::to_string).collect(),
        ..ChatSession::default()
    };
    session.reminder.arm(greeting_id.clone());

    TransitionResult::new(session)
        .with_effect(Effect::DisarmReminder)
        .with_effect(Effect::NotifyTranscript)
        .with_effect(Effect::ArmReminder {
            message_id: greeting_id,
            delay: context.reminder_delay,
        })
}

fn begin_send(
    session: &ChatSession,
    context: &ChatContext,
    raw: &str,
) -> Result<TransitionResult, TransitionError> {
    let text = normalize_message_text(trim_text(raw));
    if text.is_empty() {
        return Err(TransitionError::EmptyMessage);
    }
    if session.is_terminal() {
        return Err(TransitionError::SessionTerminal);
    }

    let mut next = session.clone();
    next.status = SessionStatus::Sending;
    next.error = None;
    next.reminder = Default::default();
    next.messages.push(ChatMessage::user(context.next_id(), text.clone()));
    next.input.clear();
    next.quick_replies.clear();

    let request = Effect::request_chat(session.generation, text, session.conversation_id.clone());
    Ok(TransitionResult::new(next)
        .with_effect(Effect::DisarmReminder)
        .with_effect(Effect::NotifyTranscript)
        .with_effect(request))
}

fn apply_reply(
    session: &ChatSession,
    context: &ChatContext,
    response: &ChatResponse,
) -> TransitionResult {
    let mut next = session.clone();

    if let Some(id) = response.conversation_id.as_deref().filter(|id| !id.is_empty()) {
        next.conversation_id = Some(id.to_string());
    }
    next.phase.clone_from(&response.phase);
    next.quick_replies = normalize_options(response.options.as_deref());
    next.input_type = normalize_input_type(response.input_type.as_deref());
    next.progress = FieldProgress::from_response(response);

    let terminal = next.is_terminal();
    next.status = SessionStatus::settled(terminal);

    let reply = normalize_message_text(trim_text(response.response.as_deref().unwrap_or_default()));
    let mut effects = vec![Effect::NotifyTranscript];

    if reply.is_empty() {
        next.messages
            .push(ChatMessage::assistant(context.next_id(), EMPTY_REPLY_PLACEHOLDER));
    } else {
        let message = ChatMessage::assistant(context.next_id(), reply);
        if !terminal {
            next.reminder.arm(message.id.clone());
            effects.push(Effect::ArmReminder {
                message_id: message.id.clone(),
                delay: context.reminder_delay,
            });
        }
        next.messages.push(message);
    }

    TransitionResult::new(next).with_effects(effects)
}

fn apply_failure(
    session: &ChatSession,
    context: &ChatContext,
    error: &GatewayError,
) -> TransitionResult {
    let message = error.user_message(REQUEST_FAILED_FALLBACK);

    let mut next = session.clone();
    next.status = SessionStatus::settled(next.is_terminal());
    next.error = Some(message.clone());
    next.quick_replies.clear();
    next.input_type = InputType::Text;
    next.messages.push(ChatMessage::assistant(
        context.next_id(),
        format!("{ERROR_BUBBLE_PREFIX}{message}"),
    ));

    TransitionResult::new(next)
        .with_effect(Effect::NotifyTranscript)
        .with_effect(Effect::NotifyError { message })
}

/// Timer fired. Only the currently armed timer counts; every other guard
/// aborts silently after consuming it.
fn reminder_due(
    session: &ChatSession,
    message_id: MessageId,
) -> Result<TransitionResult, TransitionError> {
    if !session.reminder.is_armed_for(&message_id) {
        return Err(TransitionError::ReminderSuperseded(message_id));
    }

    let mut next = session.clone();
    next.reminder.disarm();

    if next.is_terminal() || next.is_sending() || next.reminder.already_reminded(&message_id) {
        return Ok(TransitionResult::new(next));
    }

    let Some(index) = next.messages.iter().position(|m| m.id == message_id) else {
        return Ok(TransitionResult::new(next));
    };
    if next.messages.iter().skip(index + 1).any(ChatMessage::is_user) {
        return Ok(TransitionResult::new(next));
    }

    let effect = Effect::request_reminder(
        next.generation,
        next.conversation_id.clone(),
        next.messages[index].text.clone(),
    );
    next.reminder.reminded = Some(message_id);
    Ok(TransitionResult::new(next).with_effect(effect))
}

/// Reminder text is appended as-is; it never arms another reminder.
/// Dropped once the conversation moved on (a send resets the slot) or ended.
fn apply_reminder_reply(
    session: &ChatSession,
    context: &ChatContext,
    response: &ReminderResponse,
) -> TransitionResult {
    if session.is_terminal() || session.reminder.reminded.is_none() {
        return TransitionResult::new(session.clone());
    }

    let text = normalize_message_text(trim_text(response.response.as_deref().unwrap_or_default()));
    if text.is_empty() {
        return TransitionResult::new(session.clone());
    }

    let mut next = session.clone();
    next.messages.push(ChatMessage::assistant(context.next_id(), text));
    TransitionResult::new(next).with_effect(Effect::NotifyTranscript)
}
