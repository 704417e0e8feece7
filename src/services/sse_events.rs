use std::sync::{Arc, Weak};

use tracing::debug;

use crate::{
    dto::sse::ServerEvent,
    state::{
        AppState, SharedState,
        event_bus::{SubscriberError, Subscription},
        intent::{Intent, IntentKind},
    },
};

const EVENT_INTENT_PREFIX: &str = "intent.";

/// SSE event name carrying intents of `kind`, e.g. `intent.clue_reveal`.
pub fn intent_event_name(kind: IntentKind) -> String {
    format!("{EVENT_INTENT_PREFIX}{}", kind.snake_name())
}

/// Forward every published intent to the public SSE stream.
///
/// The subscriber only holds a weak handle on the state so the state can own
/// the returned subscription.
pub fn bridge_intents(state: &SharedState) -> Subscription {
    let weak: Weak<AppState> = Arc::downgrade(state);
    state.bus().subscribe(move |intent| {
        let Some(state) = weak.upgrade() else {
            return Ok(());
        };
        send_intent(&state, intent)
    })
}

fn send_intent(state: &AppState, intent: &Intent) -> Result<(), SubscriberError> {
    let hub = state.public_sse();
    if hub.receiver_count() == 0 {
        debug!(kind = %intent.kind(), "no SSE client connected; intent not forwarded");
        return Ok(());
    }
    let event = ServerEvent::json(Some(intent_event_name(intent.kind())), intent)
        .map_err(|err| SubscriberError::new(format!("failed to serialize intent: {err}")))?;
    hub.broadcast(event);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_use_snake_case_kind() {
        assert_eq!(intent_event_name(IntentKind::ClueReveal), "intent.clue_reveal");
        assert_eq!(
            intent_event_name(IntentKind::DailyDoubleClueReveal),
            "intent.daily_double_clue_reveal"
        );
    }
}
