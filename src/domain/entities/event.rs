use serde::Deserialize;

/// Type of an inbound firehose event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Message,
    PresenceChange,
    #[serde(other)]
    Other,
}

/// One event read from the real-time transport.
///
/// Every field is optional so that partial frames (no `type`, no `text`)
/// still deserialize and can be skipped by the filter instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type", default)]
    pub kind: Option<EventType>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
}

impl InboundEvent {
    pub fn message(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: Some(EventType::Message),
            text: Some(text.into()),
            channel: Some(channel.into()),
        }
    }

    pub fn presence_change() -> Self {
        Self {
            kind: Some(EventType::PresenceChange),
            text: None,
            channel: None,
        }
    }

    pub fn is_presence_change(&self) -> bool {
        self.kind == Some(EventType::PresenceChange)
    }
}
