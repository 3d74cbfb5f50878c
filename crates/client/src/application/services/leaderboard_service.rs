//! Leaderboard Service - leaderboards, leagues and rating statistics
//!
//! The UI depends on `Arc<dyn LeaderboardService>` only. Which variant it
//! gets is decided once at start-up: [`LiveLeaderboardService`] for the
//! online profile, [`super::MockLeaderboardService`] for offline use.

use lobby_domain::{
    Division, League, LeagueEntry, Leaderboard, LeaderboardEntry, Page, PlayerId, RatingStat,
};

use super::lobby_service::LobbyService;
use crate::application::async_result::AsyncResult;

pub trait LeaderboardService: Send + Sync {
    /// Rating histogram of the leaderboard named `technical_name`.
    fn get_leaderboard_stats(&self, technical_name: &str) -> AsyncResult<Vec<RatingStat>>;
    fn get_leaderboards(&self) -> AsyncResult<Vec<Leaderboard>>;
    fn get_entries(&self, leaderboard: &Leaderboard) -> AsyncResult<Vec<LeaderboardEntry>>;
    fn get_entries_for_player(&self, player_id: PlayerId)
        -> AsyncResult<Vec<LeaderboardEntry>>;
    fn get_paged_entries(
        &self,
        leaderboard: &Leaderboard,
        count: u32,
        page: u32,
    ) -> AsyncResult<Page<LeaderboardEntry>>;

    fn get_leagues(&self) -> AsyncResult<Vec<League>>;
    fn get_divisions(&self, league: &League) -> AsyncResult<Vec<Division>>;
    fn get_division_entries(&self, division: &Division) -> AsyncResult<Vec<LeagueEntry>>;
    fn get_league_entry_for_player(
        &self,
        player_id: PlayerId,
        league: &League,
    ) -> AsyncResult<Option<LeagueEntry>>;
    /// Ladder view of one division.
    fn get_league_entries(&self, division: &Division) -> AsyncResult<Vec<LeagueEntry>>;
}

/// Leaderboard data from the lobby API, through the facade.
#[derive(Clone)]
pub struct LiveLeaderboardService {
    lobby: LobbyService,
}

impl LiveLeaderboardService {
    pub fn new(lobby: LobbyService) -> Self {
        Self { lobby }
    }
}

impl LeaderboardService for LiveLeaderboardService {
    fn get_leaderboard_stats(&self, technical_name: &str) -> AsyncResult<Vec<RatingStat>> {
        self.lobby.get_leaderboard_stats(technical_name)
    }

    fn get_leaderboards(&self) -> AsyncResult<Vec<Leaderboard>> {
        self.lobby.get_leaderboards()
    }

    fn get_entries(&self, leaderboard: &Leaderboard) -> AsyncResult<Vec<LeaderboardEntry>> {
        self.lobby.get_leaderboard_entries(leaderboard)
    }

    fn get_entries_for_player(
        &self,
        player_id: PlayerId,
    ) -> AsyncResult<Vec<LeaderboardEntry>> {
        self.lobby.get_leaderboard_entries_for_player(player_id)
    }

    fn get_paged_entries(
        &self,
        leaderboard: &Leaderboard,
        count: u32,
        page: u32,
    ) -> AsyncResult<Page<LeaderboardEntry>> {
        self.lobby
            .get_paged_leaderboard_entries(leaderboard, count, page)
    }

    fn get_leagues(&self) -> AsyncResult<Vec<League>> {
        self.lobby.get_leagues()
    }

    fn get_divisions(&self, league: &League) -> AsyncResult<Vec<Division>> {
        self.lobby.get_divisions(league)
    }

    fn get_division_entries(&self, division: &Division) -> AsyncResult<Vec<LeagueEntry>> {
        self.lobby.get_division_entries(division)
    }

    fn get_league_entry_for_player(
        &self,
        player_id: PlayerId,
        league: &League,
    ) -> AsyncResult<Option<LeagueEntry>> {
        self.lobby.get_league_entry_for_player(player_id, league)
    }

    fn get_league_entries(&self, division: &Division) -> AsyncResult<Vec<LeagueEntry>> {
        self.lobby.get_division_entries(division)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lobby_domain::DivisionId;
    use lobby_shared::{LeagueSeasonScoreDto, PlayerDto};
    use tokio::runtime::Handle;

    use crate::application::mapper::ApiDtoMapper;
    use crate::application::tasks::TaskService;
    use crate::infrastructure::messaging::EventBus;
    use crate::ports::outbound::{MockApiAccessor, MockServerAccessor};

    #[tokio::test]
    async fn league_entries_delegate_to_division_entries() {
        let mut api = MockApiAccessor::new();
        api.expect_get_league_season_scores()
            .withf(|division| division.as_str() == "3")
            .times(1)
            .returning(|_| {
                Ok(vec![LeagueSeasonScoreDto {
                    id: "1".to_string(),
                    score: Some(14),
                    game_count: Some(10),
                    won_games: Some(5),
                    player: Some(PlayerDto {
                        id: "7".to_string(),
                        login: Some("Bob".to_string()),
                    }),
                    subdivision: None,
                }])
            });
        let lobby = LobbyService::new(
            Arc::new(MockServerAccessor::new()),
            Arc::new(api),
            Arc::new(ApiDtoMapper),
            EventBus::new(),
            TaskService::new(Handle::current(), 2),
        );
        let service: Arc<dyn LeaderboardService> = Arc::new(LiveLeaderboardService::new(lobby));

        let division = Division {
            id: DivisionId::new("3"),
            league_technical_name: "ladder1v1".to_string(),
            name_key: "leagues.divisionName.bronze".to_string(),
            index: 1,
            highest_score: 25,
            min_rating: None,
            max_rating: None,
        };
        let entries = service.get_league_entries(&division).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username, "Bob");
        assert_eq!(entries[0].win_loss_ratio, 50.0);
    }
}
