//! Lobby API port (query-style HTTP API).

use async_trait::async_trait;

use lobby_domain::{DivisionId, PlayerId};
use lobby_shared::{
    LeaderboardDto, LeaderboardRatingDto, LeagueDto, LeagueSeasonScoreDto, NewsPostDto,
    ReviewDto, ReviewKind, SubdivisionDto,
};

use crate::application::ServiceError;

/// Data access against the lobby API.
///
/// Implementations only produce [`ServiceError::Transport`] and
/// [`ServiceError::Mapping`] failures; validation happens before they are called.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiAccessor: Send + Sync {
    // News
    async fn get_news(&self) -> Result<Vec<NewsPostDto>, ServiceError>;

    // Leaderboards
    async fn get_leaderboards(&self) -> Result<Vec<LeaderboardDto>, ServiceError>;
    async fn get_leaderboard_ratings(
        &self,
        leaderboard_technical_name: &str,
    ) -> Result<Vec<LeaderboardRatingDto>, ServiceError>;
    async fn get_leaderboard_ratings_for_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<LeaderboardRatingDto>, ServiceError>;
    /// One page of ratings plus the total page count.
    async fn get_leaderboard_ratings_page(
        &self,
        leaderboard_technical_name: &str,
        count: u32,
        page: u32,
    ) -> Result<(Vec<LeaderboardRatingDto>, u32), ServiceError>;

    // Leagues
    async fn get_leagues(&self) -> Result<Vec<LeagueDto>, ServiceError>;
    async fn get_subdivisions(
        &self,
        league_technical_name: &str,
    ) -> Result<Vec<SubdivisionDto>, ServiceError>;
    async fn get_league_season_scores(
        &self,
        subdivision_id: &DivisionId,
    ) -> Result<Vec<LeagueSeasonScoreDto>, ServiceError>;
    async fn get_league_season_score_for_player(
        &self,
        player_id: PlayerId,
        league_technical_name: &str,
    ) -> Result<Option<LeagueSeasonScoreDto>, ServiceError>;

    // Reviews
    /// Create a review of `subject_id`; returns the stored review with its id.
    async fn create_review(
        &self,
        kind: ReviewKind,
        subject_id: &str,
        review: &ReviewDto,
    ) -> Result<ReviewDto, ServiceError>;
    async fn update_review(&self, kind: ReviewKind, review: &ReviewDto)
        -> Result<(), ServiceError>;
    async fn delete_review(&self, kind: ReviewKind, review_id: &str) -> Result<(), ServiceError>;
}
