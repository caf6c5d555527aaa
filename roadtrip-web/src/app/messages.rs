//! Pure rendering of engine outcomes into user-facing status lines.
use roadtrip_core::{AdvanceOutcome, StartFix, StartOutcome};

/// Messages for a completed `start` call.
#[must_use]
pub fn start_messages(outcome: &StartOutcome) -> Vec<String> {
    let mut messages = Vec::new();
    if outcome.fix == StartFix::Fallback {
        messages.push(
            "Could not read your device location; starting from the default position."
                .to_string(),
        );
    }
    messages.extend(advance_messages(&outcome.advance));
    messages
}

/// Messages for a completed `advance` call.
#[must_use]
pub fn advance_messages(outcome: &AdvanceOutcome) -> Vec<String> {
    let mut messages = Vec::new();
    if outcome.arrived {
        messages.push("You have arrived! Start a new trip whenever you like.".to_string());
    } else {
        messages.push(format!("Stopped at {}.", outcome.stop.description));
    }
    if outcome.destination_lookup_failed {
        messages.push("Destination not found; roaming freely instead.".to_string());
    }
    if !outcome.place_resolved {
        messages.push("Could not look up a place name for this stop.".to_string());
    }
    if !outcome.persisted {
        messages
            .push("Saving failed; this trip is kept in memory for this session only.".to_string());
    }
    messages
}
