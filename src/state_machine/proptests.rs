//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::state::*;
use super::*;
use crate::gateway::{ChatResponse, GatewayError, RawOption, ReminderResponse};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ChatContext {
    ChatContext::new(Duration::from_secs(30), Arc::new(SequentialIds::new("msg")))
}

fn fresh(ctx: &ChatContext) -> ChatSession {
    transition(&ChatSession::default(), ctx, Event::NewSession)
        .unwrap()
        .new_state
}

fn is_send(event: &Event) -> bool {
    matches!(
        event,
        Event::SendInput | Event::UserMessage { .. } | Event::QuickReply { .. }
    )
}

/// Structural invariants every reachable session satisfies
fn is_valid_session(session: &ChatSession) -> bool {
    let terminal_consistent =
        (session.status == SessionStatus::Terminal) == session.is_terminal();
    let armed_is_latest_assistant = match &session.reminder.armed_for {
        None => true,
        Some(id) => session
            .messages
            .last()
            .is_some_and(|m| &m.id == id && m.is_assistant()),
    };
    let nothing_armed_when_blocked =
        !(session.is_sending() || session.is_terminal()) || session.reminder.armed_for.is_none();

    terminal_consistent && armed_is_latest_assistant && nothing_armed_when_blocked
}

fn arm_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::ArmReminder { .. }))
        .count()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        Just(String::new()),
        Just("\"cité\"".to_string()),
    ]
}

fn arb_phase() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("COLLECTING".to_string())),
        Just(Some("OFFERS".to_string())),
        Just(Some(TERMINAL_PHASE.to_string())),
    ]
}

fn arb_option() -> impl Strategy<Value = RawOption> {
    prop_oneof![
        "[a-z0-9 ]{0,8}".prop_map(RawOption::text),
        "[a-z0-9 ]{0,8}".prop_map(RawOption::labelled),
        "[a-z0-9 ]{0,8}".prop_map(RawOption::valued),
    ]
}

fn arb_chat_response() -> impl Strategy<Value = ChatResponse> {
    (
        proptest::option::of(arb_text()),
        proptest::option::of("c[0-9]"),
        arb_phase(),
        proptest::option::of(proptest::collection::vec(arb_option(), 0..4)),
        proptest::option::of(prop_oneof![Just("tel"), Just("email"), Just("bogus")]),
    )
        .prop_map(|(response, conversation_id, phase, options, input_type)| ChatResponse {
            response,
            conversation_id,
            phase,
            options,
            input_type: input_type.map(str::to_string),
            ..ChatResponse::default()
        })
}

fn arb_message_id() -> impl Strategy<Value = MessageId> {
    (1u32..30).prop_map(|n| MessageId::new(format!("msg-{n}")))
}

fn arb_generation() -> impl Strategy<Value = u64> {
    0u64..4
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::InputChanged { text }),
        Just(Event::SendInput),
        arb_text().prop_map(|text| Event::UserMessage { text }),
        arb_text().prop_map(|option| Event::QuickReply { option }),
        Just(Event::NewSession),
        (arb_generation(), arb_chat_response())
            .prop_map(|(generation, response)| Event::ChatResponse { generation, response }),
        (arb_generation(), "[a-z ]{0,10}").prop_map(|(generation, message)| Event::ChatFailed {
            generation,
            error: GatewayError::network(message),
        }),
        arb_message_id().prop_map(|message_id| Event::ReminderDue { message_id }),
        (arb_generation(), proptest::option::of(arb_text())).prop_map(|(generation, response)| {
            Event::ReminderResponse {
                generation,
                response: ReminderResponse {
                    response,
                    conversation_id: None,
                },
            }
        }),
        arb_generation().prop_map(|generation| Event::ReminderFailed { generation }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Valid session after any accepted transition
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..30)) {
        let ctx = test_context();
        let mut session = fresh(&ctx);

        for event in events {
            if let Ok(result) = transition(&session, &ctx, event) {
                prop_assert!(arm_count(&result.effects) <= 1, "Armed twice: {:?}", result.effects);
                session = result.new_state;
                prop_assert!(is_valid_session(&session), "Invalid session: {:?}", session);
            }
        }
    }

    // Invariant 2: Sends are rejected while a request is in flight or the session is over
    #[test]
    fn prop_blocked_sessions_reject_sends(
        events in proptest::collection::vec(arb_event(), 0..30),
        attempt in arb_event().prop_filter("send events only", is_send),
    ) {
        let ctx = test_context();
        let mut session = fresh(&ctx);

        for event in events {
            if let Ok(result) = transition(&session, &ctx, event) {
                session = result.new_state;
            }
        }

        if session.is_sending() || session.is_terminal() {
            prop_assert!(transition(&session, &ctx, attempt).is_err());
        }
    }

    // Invariant 3: History only grows, except on a new session
    #[test]
    fn prop_history_is_append_only(events in proptest::collection::vec(arb_event(), 0..30)) {
        let ctx = test_context();
        let mut session = fresh(&ctx);

        for event in events {
            let resets = matches!(event, Event::NewSession);
            if let Ok(result) = transition(&session, &ctx, event) {
                if resets {
                    prop_assert_eq!(result.new_state.messages.len(), 1);
                } else {
                    prop_assert!(result.new_state.messages.starts_with(&session.messages));
                }
                session = result.new_state;
            }
        }
    }

    // Invariant 4: Responses tagged with another generation never apply
    #[test]
    fn prop_stale_generations_rejected(response in arb_chat_response(), offset in 1u64..3) {
        let ctx = test_context();
        let session = transition(
            &fresh(&ctx),
            &ctx,
            Event::UserMessage { text: "Bonjour".to_string() },
        )
        .unwrap()
        .new_state;

        let event = Event::ChatResponse {
            generation: session.generation + offset,
            response,
        };
        prop_assert!(
            matches!(
                transition(&session, &ctx, event),
                Err(TransitionError::StaleGeneration { .. })
            ),
            "Stale response accepted"
        );
    }

    // Invariant 5: At most one reminder request per assistant message
    #[test]
    fn prop_reminder_requested_once_per_message(
        events in proptest::collection::vec(arb_event(), 0..40)
    ) {
        let ctx = test_context();
        let mut session = fresh(&ctx);
        let mut reminded: Vec<MessageId> = Vec::new();

        for event in events {
            if let Ok(result) = transition(&session, &ctx, event) {
                session = result.new_state;
                if result.effects.iter().any(|e| matches!(e, Effect::RequestReminder { .. })) {
                    let id = session.reminder.reminded.clone().unwrap();
                    prop_assert!(!reminded.contains(&id), "Reminded twice for {}", id);
                    reminded.push(id);
                }
            }
        }
    }
}
