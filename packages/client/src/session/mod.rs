//! Room session: target selection, lifecycle state and the coordinator
//! that sequences create/join against the transport.

pub mod coordinator;
pub mod state;
pub mod target;
pub mod view;

pub use coordinator::SessionCoordinator;
pub use state::{RoomOutcome, SessionState};
pub use target::{RoomMode, RoomTarget};
pub use view::RoomView;
