use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// Reference to another player (review author, leaderboard row owner).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub username: String,
}

impl PlayerRef {
    pub fn new(id: impl Into<PlayerId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}
