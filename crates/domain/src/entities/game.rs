use serde::{Deserialize, Serialize};

use crate::GameId;

/// Featured mod selected when the player has no remembered choice.
pub const DEFAULT_FEATURED_MOD: &str = "faf";

/// A featured mod (game type) a hosted game can run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeaturedMod {
    pub technical_name: String,
    pub display_name: String,
}

impl FeaturedMod {
    pub fn new(technical_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            technical_name: technical_name.into(),
            display_name: display_name.into(),
        }
    }
}

/// A map installed locally that a game can be hosted on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSummary {
    pub name: String,
}

impl MapSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Everything the lobby server needs to open a new game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameInfo {
    pub title: String,
    pub password: Option<String>,
    pub featured_mod: String,
    pub map_name: String,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
}

/// The server's answer to a host request: how to start the game process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLaunch {
    pub uid: GameId,
    pub featured_mod: String,
    pub args: Vec<String>,
}
