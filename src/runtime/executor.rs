//! Chat runtime executor

use super::traits::TranscriptObserver;
use crate::gateway::ChatGateway;
use crate::state_machine::{
    transition, ChatContext, ChatSession, Effect, Event, MessageId, SessionView,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Drives one chat session: applies events, runs effects, publishes snapshots
pub struct ChatRuntime<G>
where
    G: ChatGateway + 'static,
{
    context: ChatContext,
    session: ChatSession,
    gateway: Arc<G>,
    observers: Vec<Arc<dyn TranscriptObserver>>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the runtime stops once every handle is dropped
    event_tx: mpsc::WeakSender<Event>,
    snapshot_tx: watch::Sender<SessionView>,
    /// Token to cancel the armed reminder timer
    reminder_cancel_token: Option<CancellationToken>,
}

impl<G> ChatRuntime<G>
where
    G: ChatGateway + 'static,
{
    pub fn new(
        context: ChatContext,
        gateway: G,
        observers: Vec<Arc<dyn TranscriptObserver>>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: &mpsc::Sender<Event>,
        snapshot_tx: watch::Sender<SessionView>,
    ) -> Self {
        Self {
            context,
            session: ChatSession::default(),
            gateway: Arc::new(gateway),
            observers,
            event_rx,
            event_tx: event_tx.downgrade(),
            snapshot_tx,
            reminder_cancel_token: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting chat runtime");

        // Every runtime opens with a greeting
        self.process_event(Event::NewSession);

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        self.disarm_reminder();
        tracing::info!(generation = self.session.generation, "Chat runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let name = event.name();

        let result = match transition(&self.session, &self.context, event) {
            Ok(r) => r,
            Err(e) if e.is_guard_rejection() => {
                tracing::debug!(event = name, reason = %e, "Ignoring rejected input");
                return;
            }
            Err(e) => {
                tracing::debug!(event = name, reason = %e, "Dropping event");
                return;
            }
        };

        self.session = result.new_state;
        self.snapshot_tx.send_replace(self.session.view());

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestChat {
                generation,
                request,
            } => {
                let gateway = self.gateway.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let event = match gateway.chat(&request).await {
                        Ok(response) => Event::ChatResponse {
                            generation,
                            response,
                        },
                        Err(error) => Event::ChatFailed { generation, error },
                    };
                    deliver(&event_tx, event).await;
                });
            }

            Effect::RequestReminder {
                generation,
                request,
            } => {
                tracing::debug!(
                    conversation_id = ?request.conversation_id,
                    "Requesting idle reminder"
                );
                let gateway = self.gateway.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let event = match gateway.reminder(&request).await {
                        Ok(response) => Event::ReminderResponse {
                            generation,
                            response,
                        },
                        Err(_) => Event::ReminderFailed { generation },
                    };
                    deliver(&event_tx, event).await;
                });
            }

            Effect::ArmReminder { message_id, delay } => self.arm_reminder(message_id, delay),

            Effect::DisarmReminder => self.disarm_reminder(),

            Effect::NotifyTranscript => {
                let view = self.session.view();
                for observer in &self.observers {
                    observer.transcript_updated(&view);
                }
            }

            Effect::NotifyError { message } => {
                tracing::warn!(error = %message, "Chat request failed");
                for observer in &self.observers {
                    observer.request_failed(&message);
                }
            }
        }
    }

    /// Cancel-then-schedule: at most one timer is ever pending
    fn arm_reminder(&mut self, message_id: MessageId, delay: Duration) {
        self.disarm_reminder();

        let token = CancellationToken::new();
        self.reminder_cancel_token = Some(token.clone());

        tracing::debug!(message_id = %message_id, delay_ms = %delay.as_millis(), "Arming reminder");
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    deliver(&event_tx, Event::ReminderDue { message_id }).await;
                }
            }
        });
    }

    fn disarm_reminder(&mut self) {
        if let Some(token) = self.reminder_cancel_token.take() {
            token.cancel();
        }
    }
}

/// Send back to the runtime if it is still running
async fn deliver(event_tx: &mpsc::WeakSender<Event>, event: Event) {
    if let Some(tx) = event_tx.upgrade() {
        let _ = tx.send(event).await;
    }
}
