//! Terminal chat room client.
//!
//! Reconciles a room session over a real-time messaging socket: creates or
//! joins a room once the transport is ready, merges the join history with
//! live messages, and tracks who else is typing.

// layers
pub mod domain;
pub mod session;
pub mod transport;
pub mod ui;

// application
pub mod config;
pub mod error;
pub mod runner;

pub use config::{ClientConfig, LobbyForm};
pub use runner::run_client;
