//! API data transfer objects.
//!
//! Each DTO is the flattened form of one JSON:API resource: the resource `id`
//! plus its attributes, with included relationships embedded under the
//! relationship name (see [`crate::jsonapi`]). Every field the server may omit
//! is optional here; deciding which ones are required is the mapper's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jsonapi::ApiResource;

/// A player account as exposed by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    #[serde(default)]
    pub login: Option<String>,
}

impl ApiResource for PlayerDto {
    const TYPE: &'static str = "player";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPostDto {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ApiResource for NewsPostDto {
    const TYPE: &'static str = "newsPost";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueDto {
    pub id: String,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description_key: Option<String>,
    #[serde(default)]
    pub name_key: Option<String>,
    #[serde(default)]
    pub technical_name: Option<String>,
    #[serde(default)]
    pub current_season_id: Option<String>,
}

impl ApiResource for LeagueDto {
    const TYPE: &'static str = "league";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdivisionDto {
    pub id: String,
    #[serde(default)]
    pub name_key: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub highest_score: Option<u32>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub max_rating: Option<f64>,
    #[serde(default)]
    pub league: Option<LeagueDto>,
}

impl ApiResource for SubdivisionDto {
    const TYPE: &'static str = "subdivision";
}

/// A player's score within one league season division.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSeasonScoreDto {
    pub id: String,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub game_count: Option<u32>,
    #[serde(default)]
    pub won_games: Option<u32>,
    #[serde(default)]
    pub player: Option<PlayerDto>,
    #[serde(default)]
    pub subdivision: Option<SubdivisionDto>,
}

impl ApiResource for LeagueSeasonScoreDto {
    const TYPE: &'static str = "leagueSeasonScore";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardDto {
    pub id: String,
    #[serde(default)]
    pub technical_name: Option<String>,
    #[serde(default)]
    pub name_key: Option<String>,
    #[serde(default)]
    pub description_key: Option<String>,
}

impl ApiResource for LeaderboardDto {
    const TYPE: &'static str = "leaderboard";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRatingDto {
    pub id: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub deviation: Option<f64>,
    #[serde(default)]
    pub total_games: Option<u32>,
    #[serde(default)]
    pub won_games: Option<u32>,
    #[serde(default)]
    pub player: Option<PlayerDto>,
    #[serde(default)]
    pub leaderboard: Option<LeaderboardDto>,
}

impl ApiResource for LeaderboardRatingDto {
    const TYPE: &'static str = "leaderboardRating";
}

/// What a review is about. Each kind is its own API resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewKind {
    Game,
    MapVersion,
    ModVersion,
}

impl ReviewKind {
    /// JSON:API resource type of reviews of this kind.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Game => "gameReview",
            Self::MapVersion => "mapVersionReview",
            Self::ModVersion => "modVersionReview",
        }
    }

    /// Name and resource type of the relationship pointing at the reviewed subject.
    pub fn subject_relationship(&self) -> (&'static str, &'static str) {
        match self {
            Self::Game => ("game", "game"),
            Self::MapVersion => ("mapVersion", "mapVersion"),
            Self::ModVersion => ("modVersion", "modVersion"),
        }
    }

    /// JSON:API collection path segment, e.g. `gameReview`.
    pub fn path_segment(&self) -> &'static str {
        self.resource_type()
    }
}

/// A review of any kind, as returned by the API.
///
/// Reviews of all three kinds share their attributes; the resource type is
/// carried by the [`ReviewKind`] passed alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: Option<i16>,
    /// Sent and returned as the `player` relationship.
    #[serde(default, alias = "player")]
    pub reviewer: Option<PlayerDto>,
}

/// Attributes sent when creating or updating a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAttributes {
    pub text: String,
    pub score: i16,
}
