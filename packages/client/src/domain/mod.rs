//! Domain layer for the chat client.
//!
//! Pure, synchronous session state: identities, presence, the message stream
//! and the classification of inbound events. Nothing here performs I/O.

pub mod entry;
pub mod event;
pub mod presence;
pub mod profile;
pub mod registry;
pub mod value_object;

pub use entry::{ChatEntry, MessageStream};
pub use event::{CHAT_MESSAGE_TAGS, Envelope, InboundEvent, TYPING_PRESENCE_TAG, classify};
pub use presence::{PresenceSnapshot, TypingSignal, derive_snapshot};
pub use profile::Profile;
pub use registry::{IdentityRegistry, UNKNOWN_PARTICIPANT};
pub use value_object::{ConnectionId, Nickname, RoomId};
