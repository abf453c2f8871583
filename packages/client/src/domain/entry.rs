//! Chat entries and the ordered message stream.

use serde_json::Value;

use super::value_object::ConnectionId;

/// One unit in the ordered message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    /// Message typed by a participant
    User {
        connection_id: Option<ConnectionId>,
        display_name: Option<String>,
        body: String,
    },
    /// Informational notice from the messaging service (joins, leaves, ...)
    System {
        /// Participant the notice is about, when the service names one
        connection_id: Option<ConnectionId>,
        display_name: Option<String>,
        body: String,
    },
}

impl ChatEntry {
    pub fn user(connection_id: ConnectionId, display_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self::User {
            connection_id: Some(connection_id),
            display_name: Some(display_name.into()),
            body: body.into(),
        }
    }

    pub fn system(display_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self::System {
            connection_id: None,
            display_name: Some(display_name.into()),
            body: body.into(),
        }
    }

    /// Build an entry from a loosely-structured chat payload.
    ///
    /// Missing or mistyped fields are tolerated: a non-string body becomes
    /// empty, and empty `permId`/`userNickname` values count as absent.
    pub fn from_payload(data: &Value) -> Self {
        let body = data
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let display_name = non_empty_str(data, "userNickname").map(str::to_string);
        let connection_id =
            non_empty_str(data, "permId").and_then(|id| ConnectionId::try_from(id).ok());

        if data.get("isSystemMessage").and_then(Value::as_bool) == Some(true) {
            return Self::System {
                connection_id,
                display_name,
                body,
            };
        }

        Self::User {
            connection_id,
            display_name,
            body,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::User { body, .. } | Self::System { body, .. } => body,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::User { display_name, .. } | Self::System { display_name, .. } => {
                display_name.as_deref()
            }
        }
    }

    pub fn connection_id(&self) -> Option<&ConnectionId> {
        match self {
            Self::User { connection_id, .. } | Self::System { connection_id, .. } => {
                connection_id.as_ref()
            }
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    /// Connection id and display name, when the entry carries both.
    pub fn identity(&self) -> Option<(&ConnectionId, &str)> {
        Some((self.connection_id()?, self.display_name()?))
    }
}

fn non_empty_str<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// Append-only ordered log of chat entries, in render order.
///
/// History delivered by the join call always precedes live entries, even
/// live entries that were received while the join was still in flight.
#[derive(Debug, Default, Clone)]
pub struct MessageStream {
    entries: Vec<ChatEntry>,
    /// Number of leading entries that came from history
    history_len: usize,
    seeded: bool,
}

impl MessageStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a live entry.
    pub fn append(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    /// Place `history` ahead of every live entry received so far.
    ///
    /// Seeding again replaces the previously seeded history only.
    pub fn seed_history(&mut self, history: Vec<ChatEntry>) {
        let history_len = history.len();
        self.entries.splice(..self.history_len, history);
        self.history_len = history_len;
        self.seeded = true;
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Whether join history has been placed into the stream.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

}
