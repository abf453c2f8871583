//! Session Coordinator.
//!
//! Owns the single transport handle of a room session and sequences
//! create/join against the transport's ready/close lifecycle. All state
//! mutation happens on the caller's task, one event at a time; create/join
//! requests run on spawned tasks and report back through the
//! [`RoomOutcome`] channel returned by [`SessionCoordinator::new`].

use std::{collections::HashSet, sync::Arc};

use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, Envelope, IdentityRegistry, InboundEvent, MessageStream, PresenceSnapshot,
        RoomId, TypingSignal, classify, derive_snapshot,
    },
    error::ClientError,
    transport::{JoinedRoom, MessageTag, Transport, TransportEvent, protocol},
};

use super::{
    state::{RoomOutcome, SessionState},
    target::{RoomMode, RoomTarget},
    view::RoomView,
};

pub struct SessionCoordinator<T: Transport + ?Sized, V: RoomView> {
    /// Outbound client handle, present from attach until the session ends
    handle: Option<Arc<T>>,
    view: V,
    state: SessionState,
    target: RoomTarget,
    /// Targets for which create/join has already fired in this session
    triggered: HashSet<RoomTarget>,
    registry: IdentityRegistry,
    messages: MessageStream,
    presence: PresenceSnapshot,
    /// Local connection id reported by the service on join
    local_connection_id: Option<ConnectionId>,
    outcomes: mpsc::UnboundedSender<RoomOutcome>,
}

impl<T: Transport + ?Sized, V: RoomView> SessionCoordinator<T, V> {
    /// Create a coordinator with no transport attached.
    ///
    /// Outcomes arriving on the returned receiver must be passed back to
    /// [`SessionCoordinator::handle_outcome`].
    pub fn new(view: V, target: RoomTarget) -> (Self, mpsc::UnboundedReceiver<RoomOutcome>) {
        let (outcomes, outcomes_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            handle: None,
            view,
            state: SessionState::Disconnected,
            target,
            triggered: HashSet::new(),
            registry: IdentityRegistry::new(),
            messages: MessageStream::new(),
            presence: PresenceSnapshot::empty(),
            local_connection_id: None,
            outcomes,
        };
        (coordinator, outcomes_rx)
    }

    /// Take ownership of the transport handle and wait for its ready signal.
    pub fn attach(&mut self, handle: Arc<T>) {
        if self.state.is_closed() {
            tracing::warn!("Session already closed; releasing new transport handle");
            release(&handle);
            return;
        }

        if let Some(previous) = self.handle.replace(handle) {
            release(&previous);
        }
        match self.state {
            SessionState::Disconnected => self.transition(SessionState::Connecting),
            SessionState::Ready => self.maybe_trigger(),
            _ => {}
        }
    }

    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Ready => self.on_ready(),
            TransportEvent::Event(envelope) => self.on_event(envelope),
            TransportEvent::Error(message) => self.on_transport_error(&message),
            TransportEvent::Closed => self.on_closed(),
        }
    }

    /// Transport-ready signal. Redundant signals never re-trigger create/join.
    pub fn on_ready(&mut self) {
        match self.state {
            SessionState::Disconnected | SessionState::Connecting => {
                self.transition(SessionState::Ready);
                self.maybe_trigger();
            }
            SessionState::Ready => self.maybe_trigger(),
            _ => tracing::debug!("Ignoring ready signal while {}", self.state),
        }
    }

    /// Transport close signal. No reconnection is attempted.
    pub fn on_closed(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.end_session();
        self.view.closed();
    }

    fn on_transport_error(&mut self, message: &str) {
        if self.state.is_active() || self.state.is_closed() {
            tracing::warn!("Transport error: {}", message);
            return;
        }
        self.view.alert(message);
    }

    /// Apply one inbound event.
    pub fn on_event(&mut self, envelope: Envelope) {
        if self.state.is_closed() {
            tracing::debug!("Dropping event for closed session");
            return;
        }

        match classify(&envelope) {
            InboundEvent::TypingPresence(signal) => self.apply_typing(&signal),
            InboundEvent::ChatMessage(entry) => {
                if let Some((connection_id, display_name)) = entry.identity() {
                    self.registry
                        .register(connection_id.clone(), display_name.to_string());
                }
                self.messages.append(entry);
                self.render();
            }
            InboundEvent::Unclassified => {
                tracing::debug!("Dropping unclassified event (type: {:?})", envelope.tag);
            }
        }
    }

    fn apply_typing(&mut self, signal: &TypingSignal) {
        self.presence = if signal.is_cleared() {
            PresenceSnapshot::empty()
        } else {
            let local = self.local_connection_id();
            derive_snapshot(signal, &self.registry, local)
        };
        self.render();
    }

    /// Change the identifiers the session enters the room with.
    ///
    /// Only honored before a create/join is in flight or after one failed;
    /// a session holds at most one room.
    pub fn set_target(&mut self, target: RoomTarget) {
        if target == self.target {
            return;
        }

        match self.state {
            SessionState::Disconnected | SessionState::Connecting | SessionState::Ready => {
                self.target = target;
                self.maybe_trigger();
            }
            _ => tracing::debug!("Ignoring room target change while {}", self.state),
        }
    }

    /// User-initiated retry after a failed create/join.
    pub fn retry(&mut self) {
        if self.state != SessionState::Ready {
            tracing::debug!("Nothing to retry while {}", self.state);
            return;
        }
        self.triggered.remove(&self.target);
        self.maybe_trigger();
    }

    fn maybe_trigger(&mut self) {
        if self.state != SessionState::Ready {
            return;
        }
        let Some(handle) = self.handle.clone() else {
            return;
        };
        if self.triggered.contains(&self.target) {
            tracing::debug!("Room request already issued for this target");
            return;
        }

        self.triggered.insert(self.target.clone());
        let target = self.target.clone();
        match target.mode.clone() {
            RoomMode::Create => {
                tracing::info!("Creating room as '{}'", target.nickname());
                self.transition(SessionState::Creating);
                self.spawn_create(handle, target);
            }
            RoomMode::Join(room_id) => {
                tracing::info!("Joining room {} as '{}'", room_id, target.nickname());
                self.transition(SessionState::Joining {
                    room_id: room_id.clone(),
                });
                self.spawn_join(handle, target, room_id);
            }
        }
    }

    fn spawn_create(&self, handle: Arc<T>, target: RoomTarget) {
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let result = handle.create_room(&target.profile).await;
            if outcomes.send(RoomOutcome::Created { target, result }).is_err() {
                tracing::debug!("Session ended before createSession resolved");
            }
        });
    }

    fn spawn_join(&self, handle: Arc<T>, target: RoomTarget, room_id: RoomId) {
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let result = handle.join_room(&target.profile, &room_id).await;
            let outcome = RoomOutcome::Joined {
                target,
                room_id,
                result,
            };
            if outcomes.send(outcome).is_err() {
                tracing::debug!("Session ended before joinSession resolved");
            }
        });
    }

    /// Apply the resolution of a create/join request.
    ///
    /// Outcomes for an abandoned session are swallowed.
    pub fn handle_outcome(&mut self, outcome: RoomOutcome) {
        if self.state.is_closed() || self.handle.is_none() {
            tracing::debug!("Ignoring room outcome for ended session: {:?}", outcome);
            return;
        }

        match outcome {
            RoomOutcome::Created { target, result } => self.on_created(target, result),
            RoomOutcome::Joined {
                target,
                room_id,
                result,
            } => self.on_joined(target, room_id, result),
        }
    }

    fn on_created(&mut self, target: RoomTarget, result: Result<RoomId, ClientError>) {
        if self.state != SessionState::Creating {
            tracing::debug!("Ignoring stale createSession outcome while {}", self.state);
            return;
        }

        match result {
            Ok(room_id) => {
                tracing::info!("Room {} created", room_id);
                self.view.room_assigned(&room_id);
                let Some(handle) = self.handle.clone() else {
                    return;
                };
                self.transition(SessionState::Joining {
                    room_id: room_id.clone(),
                });
                self.spawn_join(handle, target, room_id);
            }
            Err(e) => self.fail_request("create", &e),
        }
    }

    fn on_joined(
        &mut self,
        _target: RoomTarget,
        room_id: RoomId,
        result: Result<JoinedRoom, ClientError>,
    ) {
        if self.state.room_id() != Some(&room_id) || !self.state.is_pending() {
            tracing::debug!("Ignoring stale joinSession outcome while {}", self.state);
            return;
        }

        match result {
            Ok(joined) => {
                for entry in &joined.messages {
                    if let Some((connection_id, display_name)) = entry.identity() {
                        self.registry
                            .register(connection_id.clone(), display_name.to_string());
                    }
                }
                let history_len = joined.messages.len();
                self.messages.seed_history(joined.messages);
                if joined.local_connection_id.is_some() {
                    self.local_connection_id = joined.local_connection_id;
                }
                tracing::info!(
                    "Joined room {} ({} history entries, {} live)",
                    room_id,
                    history_len,
                    self.messages.len() - history_len
                );
                self.transition(SessionState::Active { room_id });
                self.render();
            }
            Err(e) => self.fail_request("join", &e),
        }
    }

    fn fail_request(&mut self, action: &str, error: &ClientError) {
        tracing::warn!("Failed to {} room: {}", action, error);
        self.transition(SessionState::Ready);
        self.view.alert(&error.alert_text());
    }

    /// Send a chat message. Empty text or a missing handle is a no-op.
    pub fn send_message(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some(handle) = &self.handle else {
            return;
        };
        if let Err(e) = handle.send(MessageTag::SendMessage, protocol::chat_payload(text)) {
            tracing::warn!("Failed to send message: {}", e);
        }
    }

    /// Forward a typing-presence update, including redundant ones.
    pub fn set_typing(&self, typing: bool) {
        let Some(handle) = &self.handle else {
            return;
        };
        if let Err(e) = handle.send(MessageTag::SetTypingPresence, protocol::typing_payload(typing)) {
            tracing::warn!("Failed to send typing presence: {}", e);
        }
    }

    /// Leave the room and release the transport handle.
    ///
    /// Safe to call on every exit path, any number of times.
    pub fn teardown(&mut self) {
        if self.handle.is_none() && self.state.is_closed() {
            return;
        }
        self.end_session();
    }

    fn end_session(&mut self) {
        if let Some(handle) = self.handle.take() {
            release(&handle);
        }
        self.registry.clear();
        self.presence = PresenceSnapshot::empty();
        self.local_connection_id = None;
        self.transition(SessionState::Closed);
    }

    /// Local participant's connection id.
    ///
    /// Prefers the id reported on join; otherwise falls back to reverse
    /// lookup of the local nickname, where the most recently registered
    /// participant with that name wins.
    pub fn local_connection_id(&self) -> Option<&ConnectionId> {
        self.local_connection_id
            .as_ref()
            .or_else(|| self.registry.reverse_lookup(self.target.nickname().as_str()))
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Session state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn render(&mut self) {
        self.view.render(&self.messages, &self.presence);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.state.room_id()
    }

    pub fn target(&self) -> &RoomTarget {
        &self.target
    }

    pub fn messages(&self) -> &MessageStream {
        &self.messages
    }

    pub fn presence(&self) -> &PresenceSnapshot {
        &self.presence
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }
}

impl<T: Transport + ?Sized, V: RoomView> Drop for SessionCoordinator<T, V> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Best-effort handle release; failures never block the session from closing.
fn release<T: Transport + ?Sized>(handle: &Arc<T>) {
    if let Err(e) = handle.teardown() {
        tracing::debug!("Ignoring transport teardown error: {}", e);
    }
}
