//! Offline leaderboard data.
//!
//! Used when no lobby API is reachable: every query answers with an empty
//! result, except the division ladder, which is filled with synthetic
//! players so the ladder view has something to render.

use rand::distributions::Alphanumeric;
use rand::Rng;

use lobby_domain::{
    Division, League, LeagueEntry, Leaderboard, LeaderboardEntry, Page, PlayerId, RatingStat,
};

use super::leaderboard_service::LeaderboardService;
use crate::application::async_result::AsyncResult;
use crate::application::tasks::TaskService;

/// Number of synthetic entries in a generated division ladder.
pub const GENERATED_ENTRY_COUNT: usize = 10_000;

const GENERATED_NAME_LENGTH: usize = 10;
const READING_LADDER_TITLE: &str = "Reading ladder";

#[derive(Clone)]
pub struct MockLeaderboardService {
    tasks: TaskService,
}

impl MockLeaderboardService {
    pub fn new(tasks: TaskService) -> Self {
        Self { tasks }
    }
}

impl LeaderboardService for MockLeaderboardService {
    fn get_leaderboard_stats(&self, _technical_name: &str) -> AsyncResult<Vec<RatingStat>> {
        AsyncResult::resolved(Vec::new())
    }

    fn get_leaderboards(&self) -> AsyncResult<Vec<Leaderboard>> {
        AsyncResult::resolved(Vec::new())
    }

    fn get_entries(&self, _leaderboard: &Leaderboard) -> AsyncResult<Vec<LeaderboardEntry>> {
        AsyncResult::resolved(Vec::new())
    }

    fn get_entries_for_player(
        &self,
        _player_id: PlayerId,
    ) -> AsyncResult<Vec<LeaderboardEntry>> {
        AsyncResult::resolved(Vec::new())
    }

    fn get_paged_entries(
        &self,
        _leaderboard: &Leaderboard,
        _count: u32,
        _page: u32,
    ) -> AsyncResult<Page<LeaderboardEntry>> {
        AsyncResult::resolved(Page::empty())
    }

    fn get_leagues(&self) -> AsyncResult<Vec<League>> {
        AsyncResult::resolved(Vec::new())
    }

    fn get_divisions(&self, _league: &League) -> AsyncResult<Vec<Division>> {
        AsyncResult::resolved(Vec::new())
    }

    fn get_division_entries(&self, _division: &Division) -> AsyncResult<Vec<LeagueEntry>> {
        AsyncResult::resolved(Vec::new())
    }

    fn get_league_entry_for_player(
        &self,
        _player_id: PlayerId,
        _league: &League,
    ) -> AsyncResult<Option<LeagueEntry>> {
        AsyncResult::resolved(None)
    }

    fn get_league_entries(&self, division: &Division) -> AsyncResult<Vec<LeagueEntry>> {
        tracing::debug!(division_id = %division.id, "Generating offline ladder");
        self.tasks.submit_blocking(READING_LADDER_TITLE, || {
            Ok(generate_league_entries(
                &mut rand::thread_rng(),
                GENERATED_ENTRY_COUNT,
            ))
        })
    }
}

/// Random players: 10-char alphanumeric name, score in [0, 25), games in
/// [0, 10000), win/loss ratio in [0, 100).
pub fn generate_league_entries<R: Rng>(rng: &mut R, count: usize) -> Vec<LeagueEntry> {
    (0..count)
        .map(|_| {
            let username: String = (0..GENERATED_NAME_LENGTH)
                .map(|_| char::from(rng.sample(Alphanumeric)))
                .collect();
            LeagueEntry::new(
                username,
                rng.gen_range(0..25),
                rng.gen_range(0..10_000),
                rng.gen_range(0.0..100.0),
            )
        })
        .collect()
}
