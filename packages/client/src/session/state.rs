//! Session lifecycle states and create/join outcomes.

use std::fmt;

use crate::{domain::RoomId, error::ClientError, transport::JoinedRoom};

use super::target::RoomTarget;

/// Session lifecycle.
///
/// `Disconnected → Connecting → Ready → (Creating | Joining) → Active`, and
/// any state → `Closed` when the transport closes or the session is torn down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No transport handle attached
    #[default]
    Disconnected,
    /// Handle attached, waiting for the ready signal
    Connecting,
    /// Transport ready; create/join not started or last attempt failed
    Ready,
    Creating,
    Joining {
        room_id: RoomId,
    },
    Active {
        room_id: RoomId,
    },
    Closed,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Create/join request in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Creating | Self::Joining { .. })
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::Joining { room_id } | Self::Active { room_id } => Some(room_id),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Ready => f.write_str("ready"),
            Self::Creating => f.write_str("creating"),
            Self::Joining { room_id } => write!(f, "joining {}", room_id),
            Self::Active { room_id } => write!(f, "active in {}", room_id),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// Resolution of a create/join request, fed back into the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomOutcome {
    Created {
        target: RoomTarget,
        result: Result<RoomId, ClientError>,
    },
    Joined {
        target: RoomTarget,
        room_id: RoomId,
        result: Result<JoinedRoom, ClientError>,
    },
}
