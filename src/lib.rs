//! Client core for the coverage advisor chat
//!
//! A session state machine driven by a tokio runtime, talking to the
//! dialogue backend over HTTP and nudging idle users with a one-shot
//! reminder.

pub mod config;
pub mod gateway;
pub mod normalize;
pub mod offers;
pub mod presenter;
pub mod runtime;
pub mod state_machine;
