//! Error types for the Chanoma chat client.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Nickname is empty or whitespace only
    #[error("Nickname must not be empty")]
    EmptyNickname,

    /// Room ID is empty or whitespace only
    #[error("Room ID must not be empty")]
    EmptyRoomId,

    /// Connection ID is empty
    #[error("Connection ID must not be empty")]
    EmptyConnectionId,
}

/// Lobby input errors, shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    /// Create mode requires a nickname
    #[error("Enter a nickname first")]
    MissingNickname,

    /// Join mode requires both a nickname and a room ID
    #[error("Enter nickname and room ID")]
    MissingNicknameOrRoomId,
}

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Transport could not be established or failed while reading
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Transport closed before the request completed
    #[error("Connection closed")]
    ConnectionClosed,

    /// Transport has been torn down or was never attached
    #[error("Not connected")]
    NotConnected,

    /// Messaging service rejected the request
    #[error("{0}")]
    RequestFailed(String),

    /// Messaging service did not answer in time
    #[error("Request '{0}' timed out")]
    RequestTimedOut(String),

    /// Response could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Human-readable text shown through the alert surface.
    pub fn alert_text(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            "Failed to connect to room".to_string()
        } else {
            text
        }
    }
}
