//! Events published after a state change succeeded on the server.
//!
//! Each event carries a snapshot of the entity that changed. They are never
//! published for failed operations.

use serde::{Deserialize, Serialize};

use crate::Avatar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum LobbyEvent {
    /// The current player now wears `avatar`.
    AvatarChanged { avatar: Avatar },
}
