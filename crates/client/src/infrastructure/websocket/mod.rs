//! Lobby server connection (JSON messages over a websocket).

pub mod client;
pub mod pending;

pub use client::LobbyServerClient;
pub use pending::{PendingReplies, Resolution, WaiterId};
