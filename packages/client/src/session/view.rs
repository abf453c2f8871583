//! User-facing boundary consumed by the session coordinator.

use crate::domain::{MessageStream, PresenceSnapshot, RoomId};

/// Rendering and notification surface.
pub trait RoomView {
    /// Called on every change of the message stream or presence snapshot.
    fn render(&mut self, messages: &MessageStream, typing: &PresenceSnapshot);

    /// Blocking notification for create/join and connect failures.
    fn alert(&mut self, message: &str);

    /// Room id became known after a successful create.
    fn room_assigned(&mut self, _room_id: &RoomId) {}

    /// Transport closed; the session will not continue.
    fn closed(&mut self) {}
}
