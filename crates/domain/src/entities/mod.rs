//! Entities shown by the lobby UI.
//!
//! Remote entities are built once from a server response and never mutated;
//! a refresh fetches new values. [`Review`] is the only locally authored one.

mod avatar;
mod game;
mod leaderboard;
mod league;
mod news;
mod page;
mod player;
mod review;

pub use avatar::Avatar;
pub use game::{FeaturedMod, GameLaunch, MapSummary, NewGameInfo, DEFAULT_FEATURED_MOD};
pub use leaderboard::{Leaderboard, LeaderboardEntry, RatingStat, RATING_BUCKET_SIZE};
pub use league::{Division, League, LeagueEntry};
pub use news::{NewsItem, NewsTag};
pub use page::Page;
pub use player::PlayerRef;
pub use review::{Review, MAX_REVIEW_SCORE, MIN_REVIEW_SCORE};
