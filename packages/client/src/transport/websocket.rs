//! WebSocket implementation of [`Transport`].
//!
//! A background task owns the socket: it forwards queued outbound frames,
//! resolves pending requests by `callbackId`, and pushes every other frame to
//! the event channel.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use uuid::Uuid;

use crate::{
    domain::{Profile, RoomId},
    error::ClientError,
};

use super::{
    JoinedRoom, Transport, TransportEvent,
    protocol::{self, InboundFrame, MessageTag, OutboundFrame},
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// WebSocket URL of the messaging service
    pub url: String,
    /// How long create/join requests wait for a response
    pub request_timeout: Duration,
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Requests awaiting a response, keyed by callback id
type PendingRequests = Mutex<HashMap<String, oneshot::Sender<Value>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct WebSocketTransport {
    outbound: mpsc::UnboundedSender<String>,
    pending: Arc<PendingRequests>,
    request_timeout: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
    torn_down: AtomicBool,
}

impl WebSocketTransport {
    /// Start connecting in the background.
    ///
    /// Must be called inside a tokio runtime. The returned receiver yields
    /// [`TransportEvent::Ready`] once the socket is open.
    pub fn connect(
        config: TransportConfig,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let pending = Arc::new(Mutex::new(HashMap::new()));

        let task = tokio::spawn(connection_loop(
            config.url,
            outbound_rx,
            events_tx,
            pending.clone(),
        ));

        let transport = Arc::new(Self {
            outbound: outbound_tx,
            pending,
            request_timeout: config.request_timeout,
            task: Mutex::new(Some(task)),
            torn_down: AtomicBool::new(false),
        });
        (transport, events_rx)
    }

    fn ensure_attached(&self) -> Result<(), ClientError> {
        if self.torn_down.load(Ordering::Acquire) {
            return Err(ClientError::NotConnected);
        }
        Ok(())
    }

    fn enqueue(&self, frame: OutboundFrame) -> Result<(), ClientError> {
        let text = frame.to_json()?;
        self.outbound
            .send(text)
            .map_err(|_| ClientError::ConnectionClosed)
    }

    async fn request(&self, tag: MessageTag, payload: Value) -> Result<Value, ClientError> {
        self.ensure_attached()?;

        let callback_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        lock(&self.pending).insert(callback_id.clone(), tx);

        if let Err(e) = self.enqueue(OutboundFrame::new(tag, payload, callback_id.clone())) {
            lock(&self.pending).remove(&callback_id);
            return Err(e);
        }
        tracing::debug!("Sent '{}' request ({})", tag, callback_id);

        let data = match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(data)) => data,
            // Sender dropped: connection ended or transport torn down
            Ok(Err(_)) => return Err(ClientError::ConnectionClosed),
            Err(_) => {
                lock(&self.pending).remove(&callback_id);
                return Err(ClientError::RequestTimedOut(tag.to_string()));
            }
        };

        match protocol::response_error(&data) {
            Some(message) => Err(ClientError::RequestFailed(message)),
            None => Ok(data),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn create_room(&self, profile: &Profile) -> Result<RoomId, ClientError> {
        let data = self
            .request(
                MessageTag::CreateSession,
                protocol::create_session_payload(profile),
            )
            .await?;
        protocol::parse_created_room(data)
    }

    async fn join_room(
        &self,
        profile: &Profile,
        room_id: &RoomId,
    ) -> Result<JoinedRoom, ClientError> {
        let data = self
            .request(
                MessageTag::JoinSession,
                protocol::join_session_payload(profile, room_id),
            )
            .await?;
        protocol::parse_joined_room(data)
    }

    fn send(&self, tag: MessageTag, payload: Value) -> Result<(), ClientError> {
        self.ensure_attached()?;
        self.enqueue(OutboundFrame::new(tag, payload, Uuid::new_v4().to_string()))
    }

    fn teardown(&self) -> Result<(), ClientError> {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
        // Dropping the senders fails every waiting request with ConnectionClosed
        lock(&self.pending).clear();
        tracing::debug!("WebSocket transport torn down");
        Ok(())
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            tracing::debug!("Ignoring teardown error on drop: {}", e);
        }
    }
}

/// Owns the socket until it closes or the transport is torn down.
async fn connection_loop(
    url: String,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
    pending: Arc<PendingRequests>,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            tracing::warn!("Failed to connect to {}: {}", url, e);
            let _ = events.send(TransportEvent::Error(format!(
                "Failed to connect to {}: {}",
                url, e
            )));
            lock(&pending).clear();
            let _ = events.send(TransportEvent::Closed);
            return;
        }
    };

    tracing::info!("Connected to messaging service at {}", url);
    let _ = events.send(TransportEvent::Ready);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            frame = outbound_rx.recv() => match frame {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        tracing::warn!("WebSocket write error: {}", e);
                        let _ = events.send(TransportEvent::Error(format!("Connection lost: {}", e)));
                        break;
                    }
                }
                None => {
                    // Transport handle dropped
                    let _ = write.close().await;
                    break;
                }
            },
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => dispatch_frame(text.as_str(), &events, &pending),
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Messaging service closed the connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    let _ = events.send(TransportEvent::Error(format!("Connection lost: {}", e)));
                    break;
                }
            },
        }
    }

    lock(&pending).clear();
    let _ = events.send(TransportEvent::Closed);
}

/// Route one inbound text frame to its waiting request or the event channel.
fn dispatch_frame(
    text: &str,
    events: &mpsc::UnboundedSender<TransportEvent>,
    pending: &PendingRequests,
) {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!("Dropping malformed frame: {}", e);
            return;
        }
    };

    match frame.callback_id {
        Some(callback_id) => match lock(pending).remove(&callback_id) {
            Some(waiter) => {
                let _ = waiter.send(frame.data);
            }
            None => tracing::debug!("Dropping response for unknown request '{}'", callback_id),
        },
        None => {
            let _ = events.send(TransportEvent::Event(frame.into_envelope()));
        }
    }
}
