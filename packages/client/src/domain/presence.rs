//! Presence Tracker: who is currently typing.
//!
//! The snapshot is re-derived wholesale from each presence event; the most
//! recent event is the only source of truth.

use serde_json::Value;

use super::{
    registry::{IdentityRegistry, UNKNOWN_PARTICIPANT},
    value_object::ConnectionId,
};

/// Typing-presence payload as understood by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingSignal {
    /// Explicit "is anyone typing" flag, when the payload carries one
    pub anyone_typing: Option<bool>,
    /// Ids of typing participants in delivery order; `None` for ids that
    /// cannot be interpreted as a connection id
    pub users_typing: Vec<Option<ConnectionId>>,
}

impl TypingSignal {
    pub fn from_payload(data: &Value) -> Self {
        let anyone_typing = data.get("anyoneTyping").and_then(Value::as_bool);
        let users_typing = data
            .get("usersTyping")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().map(typing_id).collect())
            .unwrap_or_default();

        Self {
            anyone_typing,
            users_typing,
        }
    }

    /// Whether the payload explicitly says nobody is typing.
    pub fn is_cleared(&self) -> bool {
        self.anyone_typing == Some(false)
    }
}

fn typing_id(value: &Value) -> Option<ConnectionId> {
    match value {
        Value::String(id) => ConnectionId::try_from(id.as_str()).ok(),
        Value::Number(id) => ConnectionId::new(id.to_string()).ok(),
        _ => None,
    }
}

/// Deduplicated display names of participants currently typing, in order of
/// first appearance. Never includes the local participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSnapshot {
    names: Vec<String>,
}

impl PresenceSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Derive the presence snapshot for one typing-presence event.
///
/// An explicit "nobody typing" flag clears the snapshot and the id list of
/// the same event is ignored. Otherwise every id except `local` is resolved
/// through `registry`; unknown ids resolve to the placeholder name. The
/// local participant's registered name is never listed, so a participant
/// sharing the local nickname is hidden as well.
pub fn derive_snapshot(
    signal: &TypingSignal,
    registry: &IdentityRegistry,
    local: Option<&ConnectionId>,
) -> PresenceSnapshot {
    if signal.is_cleared() {
        return PresenceSnapshot::empty();
    }

    let local_name = local.and_then(|id| registry.get(id));
    let mut names: Vec<String> = Vec::with_capacity(signal.users_typing.len());
    for id in &signal.users_typing {
        if id.is_some() && id.as_ref() == local {
            continue;
        }

        let name = id
            .as_ref()
            .map_or(UNKNOWN_PARTICIPANT, |id| registry.resolve(id));
        if Some(name) == local_name {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    PresenceSnapshot { names }
}
