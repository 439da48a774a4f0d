//! Event-to-state reducer
//!
//! Folds terminal events into the two flags that decide amplifier power.

use crate::event_bus::{Event, EventKind};
use serde::Serialize;

/// Payload of `music_status` that means the player is running.
pub const MUSIC_PLAYING: &str = "play";

/// Talk/play flags. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArbitratorState {
    /// Speech is being played back or the assistant is listening
    pub talking: bool,
    /// Music player is playing
    pub playing: bool,
}

impl ArbitratorState {
    /// Apply one event
    #[must_use]
    pub fn apply(self, event: &Event) -> Self {
        apply(self, event)
    }

    /// Amplifier signal for this state
    #[must_use]
    pub fn amp(self) -> bool {
        derive_amp(self)
    }
}

/// Compute the state that follows `event`.
#[must_use]
pub fn apply(state: ArbitratorState, event: &Event) -> ArbitratorState {
    match event.kind {
        EventKind::StartTalking | EventKind::VoiceActivated => ArbitratorState {
            talking: true,
            ..state
        },
        EventKind::StopTalking | EventKind::SpeechRecognizedSuccess => ArbitratorState {
            talking: false,
            ..state
        },
        EventKind::MusicStatus => ArbitratorState {
            playing: event.payload_str() == Some(MUSIC_PLAYING),
            ..state
        },
        _ => state,
    }
}

/// The amplifier is powered while anything is audible.
#[must_use]
pub fn derive_amp(state: ArbitratorState) -> bool {
    state.talking || state.playing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(events: &[Event]) -> ArbitratorState {
        events
            .iter()
            .fold(ArbitratorState::default(), |state, event| state.apply(event))
    }

    #[test]
    fn test_initial_state_is_silent() {
        let state = ArbitratorState::default();
        assert!(!state.talking);
        assert!(!state.playing);
        assert!(!state.amp());
    }

    #[test]
    fn test_talking_transitions() {
        let on = fold(&[Event::new(EventKind::VoiceActivated)]);
        assert!(on.talking);

        let off = on.apply(&Event::new(EventKind::SpeechRecognizedSuccess));
        assert!(!off.talking);
    }

    #[test]
    fn test_stop_talking_wins_over_music_events() {
        let state = fold(&[
            Event::new(EventKind::StartTalking),
            Event::music_status("play"),
            Event::music_status("pause"),
            Event::new(EventKind::StopTalking),
        ]);
        assert!(!state.talking);
        assert!(!state.playing);
    }

    #[test]
    fn test_music_payloads() {
        assert!(fold(&[Event::music_status("play")]).playing);
        assert!(!fold(&[Event::music_status("play"), Event::music_status("stop")]).playing);
        assert!(!fold(&[Event::music_status("play"), Event::new(EventKind::MusicStatus)]).playing);
        assert!(
            !fold(&[
                Event::music_status("play"),
                Event::with_payload(EventKind::MusicStatus, 1),
            ])
            .playing
        );
        // Exact match only
        assert!(!fold(&[Event::music_status("PLAY")]).playing);
    }

    #[test]
    fn test_unrelated_events_keep_state() {
        let before = fold(&[Event::new(EventKind::StartTalking), Event::music_status("play")]);
        let after = before
            .apply(&Event::new(EventKind::StartRecord))
            .apply(&Event::new(EventKind::StopRecord))
            .apply(&Event::new(EventKind::Other("volume".into())));
        assert_eq!(before, after);
    }

    #[test]
    fn test_amp_is_or_of_flags() {
        for talking in [false, true] {
            for playing in [false, true] {
                let state = ArbitratorState { talking, playing };
                assert_eq!(derive_amp(state), talking || playing);
            }
        }
    }
}
