//! Event Classifier.
//!
//! The messaging service multiplexes chat messages and typing presence over a
//! single channel with inconsistent tagging. [`classify`] turns each inbound
//! envelope into exactly one [`InboundEvent`] so the rest of the client can
//! rely on a clean taxonomy. Classification is total and never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{entry::ChatEntry, presence::TypingSignal};

/// Reserved tag for typing-presence events
pub const TYPING_PRESENCE_TAG: &str = "setTypingPresence";

/// Tags recognized as chat messages
pub const CHAT_MESSAGE_TAGS: [&str; 4] = ["message", "sendMessage", "sessionMessage", "chatMessage"];

/// Inbound socket event: a tag and a loosely-structured payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(tag: impl Into<String>, data: Value) -> Self {
        Self {
            tag: Some(tag.into()),
            data,
        }
    }

    /// Envelope without a tag, classified by payload shape only.
    pub fn untagged(data: Value) -> Self {
        Self { tag: None, data }
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }
}

/// Result of classifying one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    TypingPresence(TypingSignal),
    ChatMessage(ChatEntry),
    /// Unknown shape; dropped without touching any state
    Unclassified,
}

/// Classify an inbound envelope.
///
/// Rules, first match wins:
/// 1. typing-presence tag, or a `usersTyping` list, or a boolean
///    `anyoneTyping` flag → [`InboundEvent::TypingPresence`]
/// 2. a string `body`, or a recognized chat tag → [`InboundEvent::ChatMessage`]
/// 3. anything else → [`InboundEvent::Unclassified`]
pub fn classify(envelope: &Envelope) -> InboundEvent {
    let data = &envelope.data;

    let is_typing = envelope.has_tag(TYPING_PRESENCE_TAG)
        || data.get("usersTyping").is_some_and(Value::is_array)
        || data.get("anyoneTyping").is_some_and(Value::is_boolean);
    if is_typing {
        return InboundEvent::TypingPresence(TypingSignal::from_payload(data));
    }

    let is_chat = data.get("body").is_some_and(Value::is_string)
        || CHAT_MESSAGE_TAGS.iter().any(|tag| envelope.has_tag(tag));
    if is_chat {
        return InboundEvent::ChatMessage(ChatEntry::from_payload(data));
    }

    InboundEvent::Unclassified
}
