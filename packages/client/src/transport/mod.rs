//! Boundary with the external messaging service.
//!
//! ## 概要
//!
//! The session core only talks to the service through the [`Transport`]
//! trait. Lifecycle signals and pushed events arrive separately as
//! [`TransportEvent`]s on the channel returned when connecting.
//!
//! ## 実装
//!
//! - `websocket`: JSON frames over a WebSocket (tokio-tungstenite)

pub mod protocol;
pub mod websocket;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    domain::{ChatEntry, ConnectionId, Envelope, Profile, RoomId},
    error::ClientError,
};

pub use protocol::MessageTag;
pub use websocket::{TransportConfig, WebSocketTransport};

/// Signals delivered by a connected transport, one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection established; requests may be issued
    Ready,
    /// Pushed event from the service
    Event(Envelope),
    /// Connect or read failure, followed by [`TransportEvent::Closed`]
    Error(String),
    /// Connection ended; sent exactly once
    Closed,
}

/// Result of a successful join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinedRoom {
    /// Room history in delivery order
    pub messages: Vec<ChatEntry>,
    /// Local participant's connection id, when the service reports it
    pub local_connection_id: Option<ConnectionId>,
}

/// Outbound handle to the messaging service.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Create a room and return its id.
    async fn create_room(&self, profile: &Profile) -> Result<RoomId, ClientError>;

    /// Join `room_id`; the response carries the room history.
    async fn join_room(&self, profile: &Profile, room_id: &RoomId)
    -> Result<JoinedRoom, ClientError>;

    /// Fire-and-forget send; no acknowledgment is awaited.
    fn send(&self, tag: MessageTag, payload: Value) -> Result<(), ClientError>;

    /// Release the connection. Safe to call repeatedly or before connecting.
    fn teardown(&self) -> Result<(), ClientError>;
}
