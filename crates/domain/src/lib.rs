//! Lobby domain types.
//!
//! Everything the UI layer renders is expressed here: remote entities mapped
//! from API payloads, the locally authored [`Review`], events published after
//! state changes, and the closed set of cache region names.
//!
//! This crate has no I/O and no async code.

pub mod cache;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;

pub use cache::CacheName;
pub use entities::{
    Avatar, Division, FeaturedMod, GameLaunch, League, LeagueEntry, Leaderboard,
    LeaderboardEntry, MapSummary, NewGameInfo, NewsItem, NewsTag, Page, PlayerRef, RatingStat,
    Review, DEFAULT_FEATURED_MOD, MAX_REVIEW_SCORE, MIN_REVIEW_SCORE, RATING_BUCKET_SIZE,
};
pub use error::DomainError;
pub use events::LobbyEvent;
pub use ids::{
    AvatarId, DivisionId, GameId, LeaderboardId, LeagueId, MapVersionId, ModVersionId, PlayerId,
    ReviewId, SeasonId,
};
