use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DivisionId, LeagueId, PlayerId, SeasonId};

/// A league (ranked ladder with divisions) offered by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub technical_name: String,
    pub name_key: String,
    pub description_key: String,
    pub current_season_id: Option<SeasonId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One division of a league season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub league_technical_name: String,
    pub name_key: String,
    /// Position within the league, 1 being the lowest division.
    pub index: u32,
    /// Score at which players are promoted out of this division.
    pub highest_score: u32,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
}

/// A player's standing within a league division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueEntry {
    pub player_id: Option<PlayerId>,
    pub username: String,
    pub score: u32,
    pub games_played: u32,
    pub win_loss_ratio: f32,
    pub division_id: Option<DivisionId>,
}

impl LeagueEntry {
    pub fn new(username: impl Into<String>, score: u32, games_played: u32, win_loss_ratio: f32) -> Self {
        Self {
            player_id: None,
            username: username.into(),
            score,
            games_played,
            win_loss_ratio,
            division_id: None,
        }
    }
}
