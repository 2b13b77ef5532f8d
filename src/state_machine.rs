//! Core chat state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod message;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use message::{ChatMessage, IdGenerator, MessageId, Role, SequentialIds, UuidIds};
pub use state::{ChatContext, ChatSession, SessionStatus, SessionView};
pub use transition::{transition, TransitionError, TransitionResult};
