use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Names of the terminal events the arbitrator understands.
///
/// Anything else is carried as [`EventKind::Other`] and leaves the arbitrator
/// state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Speech playback started
    StartTalking,
    /// Speech playback finished
    StopTalking,
    /// Microphone recording started
    StartRecord,
    /// Microphone recording finished
    StopRecord,
    /// Wake word or hotword matched
    VoiceActivated,
    /// Recognition produced a result
    SpeechRecognizedSuccess,
    /// Music player status changed; payload is the player state
    MusicStatus,
    /// Any other terminal event
    Other(String),
}

impl EventKind {
    /// Wire name of the event
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::StartTalking => "start_talking",
            Self::StopTalking => "stop_talking",
            Self::StartRecord => "start_record",
            Self::StopRecord => "stop_record",
            Self::VoiceActivated => "voice_activated",
            Self::SpeechRecognizedSuccess => "speech_recognized_success",
            Self::MusicStatus => "music_status",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "start_talking" => Self::StartTalking,
            "stop_talking" => Self::StopTalking,
            "start_record" => Self::StartRecord,
            "stop_record" => Self::StopRecord,
            "voice_activated" => Self::VoiceActivated,
            "speech_recognized_success" => Self::SpeechRecognizedSuccess,
            "music_status" => Self::MusicStatus,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}

/// Events the plugin subscribes to.
#[must_use]
pub fn vocabulary() -> Vec<EventKind> {
    vec![
        EventKind::StartTalking,
        EventKind::StopTalking,
        EventKind::StartRecord,
        EventKind::StopRecord,
        EventKind::VoiceActivated,
        EventKind::SpeechRecognizedSuccess,
        EventKind::MusicStatus,
    ]
}

/// A named terminal notification with an optional payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name
    #[serde(rename = "name")]
    pub kind: EventKind,
    /// Optional payload (e.g. `"play"` for `music_status`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Event {
    /// Create an event without payload
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            payload: None,
        }
    }

    /// Create an event with a payload
    #[must_use]
    pub fn with_payload(kind: EventKind, payload: impl Into<Value>) -> Self {
        Self {
            kind,
            payload: Some(payload.into()),
        }
    }

    /// Shorthand for a `music_status` event
    #[must_use]
    pub fn music_status(status: &str) -> Self {
        Self::with_payload(EventKind::MusicStatus, status)
    }

    /// Payload as a string, if it is one
    #[must_use]
    pub fn payload_str(&self) -> Option<&str> {
        self.payload.as_ref().and_then(Value::as_str)
    }
}
