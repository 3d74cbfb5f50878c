//! Offline adapter: both accessor ports without a network.
//!
//! Queries come back empty and commands succeed locally, so the lobby can run
//! without a server.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use lobby_domain::{AvatarId, DivisionId, NewGameInfo, PlayerId};
use lobby_shared::{
    AvatarData, GameLaunchData, LeaderboardDto, LeaderboardRatingDto, LeagueDto,
    LeagueSeasonScoreDto, NewsPostDto, ReviewDto, ReviewKind, SubdivisionDto,
};

use crate::application::ServiceError;
use crate::ports::outbound::{ApiAccessor, ServerAccessor};

/// Accessor used by the offline profile.
#[derive(Debug)]
pub struct OfflineAccessor {
    next_game_uid: AtomicI32,
}

impl OfflineAccessor {
    pub fn new() -> Self {
        Self {
            next_game_uid: AtomicI32::new(1),
        }
    }
}

impl Default for OfflineAccessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiAccessor for OfflineAccessor {
    async fn get_news(&self) -> Result<Vec<NewsPostDto>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get_leaderboards(&self) -> Result<Vec<LeaderboardDto>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get_leaderboard_ratings(
        &self,
        _leaderboard_technical_name: &str,
    ) -> Result<Vec<LeaderboardRatingDto>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get_leaderboard_ratings_for_player(
        &self,
        _player_id: PlayerId,
    ) -> Result<Vec<LeaderboardRatingDto>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get_leaderboard_ratings_page(
        &self,
        _leaderboard_technical_name: &str,
        _count: u32,
        _page: u32,
    ) -> Result<(Vec<LeaderboardRatingDto>, u32), ServiceError> {
        Ok((Vec::new(), 1))
    }

    async fn get_leagues(&self) -> Result<Vec<LeagueDto>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get_subdivisions(
        &self,
        _league_technical_name: &str,
    ) -> Result<Vec<SubdivisionDto>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get_league_season_scores(
        &self,
        _subdivision_id: &DivisionId,
    ) -> Result<Vec<LeagueSeasonScoreDto>, ServiceError> {
        Ok(Vec::new())
    }

    async fn get_league_season_score_for_player(
        &self,
        _player_id: PlayerId,
        _league_technical_name: &str,
    ) -> Result<Option<LeagueSeasonScoreDto>, ServiceError> {
        Ok(None)
    }

    async fn create_review(
        &self,
        kind: ReviewKind,
        subject_id: &str,
        review: &ReviewDto,
    ) -> Result<ReviewDto, ServiceError> {
        let id = Uuid::new_v4().to_string();
        tracing::debug!(
            kind = kind.resource_type(),
            subject_id = %subject_id,
            review_id = %id,
            "Stored review offline"
        );
        Ok(ReviewDto {
            id: Some(id),
            ..review.clone()
        })
    }

    async fn update_review(
        &self,
        kind: ReviewKind,
        review: &ReviewDto,
    ) -> Result<(), ServiceError> {
        tracing::debug!(kind = kind.resource_type(), review_id = ?review.id, "Offline review update");
        Ok(())
    }

    async fn delete_review(&self, kind: ReviewKind, review_id: &str) -> Result<(), ServiceError> {
        tracing::debug!(kind = kind.resource_type(), review_id = %review_id, "Offline review delete");
        Ok(())
    }
}

#[async_trait]
impl ServerAccessor for OfflineAccessor {
    async fn select_avatar(&self, avatar_id: AvatarId) -> Result<(), ServiceError> {
        tracing::debug!(avatar_id = %avatar_id, "Offline avatar selection");
        Ok(())
    }

    async fn get_available_avatars(&self) -> Result<Vec<AvatarData>, ServiceError> {
        Ok(Vec::new())
    }

    async fn host_game(&self, game: &NewGameInfo) -> Result<GameLaunchData, ServiceError> {
        let uid = self.next_game_uid.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(uid, title = %game.title, map = %game.map_name, "Hosting offline game");
        Ok(GameLaunchData {
            uid,
            featured_mod: game.featured_mod.clone(),
            args: Vec::new(),
        })
    }
}
