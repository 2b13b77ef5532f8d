//! Runtime for driving a chat session
//!
//! The runtime task owns the session. Callers talk to it through a
//! [`ChatHandle`], which queues events and reads the latest snapshot.

mod executor;
pub mod traits;


pub use executor::ChatRuntime;
pub use traits::*;

use crate::gateway::ChatGateway;
use crate::state_machine::{ChatContext, Event, SessionView};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Error)]
pub enum HandleError {
    #[error("Chat runtime has stopped")]
    RuntimeStopped,
}

/// Handle to a running chat
#[derive(Clone)]
pub struct ChatHandle {
    event_tx: mpsc::Sender<Event>,
    snapshot_rx: watch::Receiver<SessionView>,
}

impl ChatHandle {
    pub async fn dispatch(&self, event: Event) -> Result<(), HandleError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HandleError::RuntimeStopped)
    }

    pub async fn set_input(&self, text: impl Into<String>) -> Result<(), HandleError> {
        self.dispatch(Event::InputChanged { text: text.into() }).await
    }

    /// Send the current input buffer
    pub async fn submit(&self) -> Result<(), HandleError> {
        self.dispatch(Event::SendInput).await
    }

    pub async fn send(&self, text: impl Into<String>) -> Result<(), HandleError> {
        self.dispatch(Event::UserMessage { text: text.into() }).await
    }

    pub async fn quick_reply(&self, option: impl Into<String>) -> Result<(), HandleError> {
        self.dispatch(Event::QuickReply {
            option: option.into(),
        })
        .await
    }

    pub async fn new_session(&self) -> Result<(), HandleError> {
        self.dispatch(Event::NewSession).await
    }

    /// Latest published snapshot
    pub fn view(&self) -> SessionView {
        self.snapshot_rx.borrow().clone()
    }

    /// Wait until a snapshot satisfies `predicate`, or give up after `timeout`
    pub async fn wait_for(
        &self,
        predicate: impl Fn(&SessionView) -> bool,
        timeout: Duration,
    ) -> Option<SessionView> {
        let mut rx = self.snapshot_rx.clone();
        let wait = async {
            loop {
                {
                    let view = rx.borrow_and_update();
                    if predicate(&view) {
                        return Some(view.clone());
                    }
                }
                if rx.changed().await.is_err() {
                    return None;
                }
            }
        };
        tokio::time::timeout(timeout, wait).await.ok().flatten()
    }
}

/// Start a runtime task on the current tokio runtime
pub fn spawn_runtime<G>(
    context: ChatContext,
    gateway: G,
    observers: Vec<Arc<dyn TranscriptObserver>>,
) -> ChatHandle
where
    G: ChatGateway + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(SessionView::default());

    let runtime = ChatRuntime::new(context, gateway, observers, event_rx, &event_tx, snapshot_tx);
    tokio::spawn(runtime.run());

    ChatHandle {
        event_tx,
        snapshot_rx,
    }
}
