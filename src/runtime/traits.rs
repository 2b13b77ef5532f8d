//! Trait abstractions for runtime output
//!
//! Observers are called synchronously from the runtime task after every
//! transcript change, so implementations must not block for long.

use crate::state_machine::SessionView;
use std::sync::Arc;

/// Receives the session after each transcript mutation
pub trait TranscriptObserver: Send + Sync {
    fn transcript_updated(&self, view: &SessionView);

    /// A chat request failed; the error bubble is already in `view.messages`
    fn request_failed(&self, _message: &str) {}
}

impl<T: TranscriptObserver + ?Sized> TranscriptObserver for Arc<T> {
    fn transcript_updated(&self, view: &SessionView) {
        (**self).transcript_updated(view);
    }

    fn request_failed(&self, message: &str) {
        (**self).request_failed(message);
    }
}
