//! Lobby Service - the read-through facade over the lobby API and server
//!
//! Every operation returns an [`AsyncResult`] immediately. Commands validate
//! their arguments on the calling thread and fail fast without touching the
//! network; everything else runs on the [`TaskService`] in the order
//! accessor, mapper, event, completion.

use std::sync::Arc;

use lobby_domain::{
    Avatar, Division, GameId, GameLaunch, League, LeagueEntry, Leaderboard, LeaderboardEntry,
    LobbyEvent, MapVersionId, ModVersionId, NewGameInfo, NewsItem, Page, PlayerId, RatingStat,
    Review,
};
use lobby_shared::ReviewKind;

use crate::application::async_result::AsyncResult;
use crate::application::error::{MappingError, ServiceError};
use crate::application::mapper::DtoMapper;
use crate::application::tasks::TaskService;
use crate::infrastructure::messaging::EventBus;
use crate::ports::outbound::{ApiAccessor, ServerAccessor};

/// Players below this many games are counted separately in rating stats.
pub const MIN_GAMES_FOR_RATING_STATS: u32 = 10;

/// Facade the UI uses for all remote lobby data.
///
/// Holds no state of its own apart from its collaborators; cloning is cheap.
#[derive(Clone)]
pub struct LobbyService {
    server: Arc<dyn ServerAccessor>,
    api: Arc<dyn ApiAccessor>,
    mapper: Arc<dyn DtoMapper>,
    events: EventBus<LobbyEvent>,
    tasks: TaskService,
}

impl LobbyService {
    pub fn new(
        server: Arc<dyn ServerAccessor>,
        api: Arc<dyn ApiAccessor>,
        mapper: Arc<dyn DtoMapper>,
        events: EventBus<LobbyEvent>,
        tasks: TaskService,
    ) -> Self {
        Self {
            server,
            api,
            mapper,
            events,
            tasks,
        }
    }

    /// The bus lobby events are posted to.
    pub fn events(&self) -> &EventBus<LobbyEvent> {
        &self.events
    }

    // =========================================================================
    // News
    // =========================================================================

    pub fn get_news(&self) -> AsyncResult<Vec<NewsItem>> {
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        self.tasks.submit("Loading news", async move {
            let posts = api.get_news().await?;
            map_all(&posts, |post| mapper.map_news_post(post))
        })
    }

    // =========================================================================
    // Leaderboards
    // =========================================================================

    pub fn get_leaderboards(&self) -> AsyncResult<Vec<Leaderboard>> {
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        self.tasks.submit("Loading leaderboards", async move {
            let leaderboards = api.get_leaderboards().await?;
            map_all(&leaderboards, |dto| mapper.map_leaderboard(dto))
        })
    }

    pub fn get_leaderboard_entries(
        &self,
        leaderboard: &Leaderboard,
    ) -> AsyncResult<Vec<LeaderboardEntry>> {
        if leaderboard.technical_name.trim().is_empty() {
            return AsyncResult::failed(ServiceError::validation(
                "Leaderboard has no technical name",
            ));
        }
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        let technical_name = leaderboard.technical_name.clone();
        self.tasks.submit("Loading leaderboard", async move {
            let ratings = api.get_leaderboard_ratings(&technical_name).await?;
            map_all(&ratings, |dto| mapper.map_leaderboard_rating(dto))
        })
    }

    pub fn get_leaderboard_entries_for_player(
        &self,
        player_id: PlayerId,
    ) -> AsyncResult<Vec<LeaderboardEntry>> {
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        self.tasks.submit("Loading player ratings", async move {
            let ratings = api.get_leaderboard_ratings_for_player(player_id).await?;
            map_all(&ratings, |dto| mapper.map_leaderboard_rating(dto))
        })
    }

    /// One page of a leaderboard; `page` starts at 1.
    pub fn get_paged_leaderboard_entries(
        &self,
        leaderboard: &Leaderboard,
        count: u32,
        page: u32,
    ) -> AsyncResult<Page<LeaderboardEntry>> {
        if leaderboard.technical_name.trim().is_empty() {
            return AsyncResult::failed(ServiceError::validation(
                "Leaderboard has no technical name",
            ));
        }
        if count == 0 || page == 0 {
            return AsyncResult::failed(ServiceError::validation(format!(
                "Invalid page request: count {} page {}",
                count, page
            )));
        }
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        let technical_name = leaderboard.technical_name.clone();
        self.tasks.submit("Loading leaderboard page", async move {
            let (ratings, total_pages) = api
                .get_leaderboard_ratings_page(&technical_name, count, page)
                .await?;
            let entries = map_all(&ratings, |dto| mapper.map_leaderboard_rating(dto))?;
            Ok(Page::new(entries, total_pages))
        })
    }

    /// Rating histogram of a leaderboard, computed from its entries.
    pub fn get_leaderboard_stats(&self, technical_name: &str) -> AsyncResult<Vec<RatingStat>> {
        if technical_name.trim().is_empty() {
            return AsyncResult::failed(ServiceError::validation(
                "Leaderboard technical name is empty",
            ));
        }
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        let technical_name = technical_name.to_string();
        self.tasks.submit("Computing rating distribution", async move {
            let ratings = api.get_leaderboard_ratings(&technical_name).await?;
            let entries = map_all(&ratings, |dto| mapper.map_leaderboard_rating(dto))?;
            Ok(RatingStat::histogram(&entries, MIN_GAMES_FOR_RATING_STATS))
        })
    }

    // =========================================================================
    // Leagues
    // =========================================================================

    pub fn get_leagues(&self) -> AsyncResult<Vec<League>> {
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        self.tasks.submit("Loading leagues", async move {
            let leagues = api.get_leagues().await?;
            map_all(&leagues, |dto| mapper.map_league(dto))
        })
    }

    pub fn get_divisions(&self, league: &League) -> AsyncResult<Vec<Division>> {
        if league.technical_name.trim().is_empty() {
            return AsyncResult::failed(ServiceError::validation("League has no technical name"));
        }
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        let technical_name = league.technical_name.clone();
        self.tasks.submit("Loading divisions", async move {
            let subdivisions = api.get_subdivisions(&technical_name).await?;
            map_all(&subdivisions, |dto| mapper.map_subdivision(dto))
        })
    }

    pub fn get_division_entries(&self, division: &Division) -> AsyncResult<Vec<LeagueEntry>> {
        if division.id.is_blank() {
            return AsyncResult::failed(ServiceError::validation("Division has no id"));
        }
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        let division_id = division.id.clone();
        self.tasks.submit("Loading division", async move {
            let scores = api.get_league_season_scores(&division_id).await?;
            map_all(&scores, |dto| mapper.map_league_season_score(dto))
        })
    }

    /// The player's entry in the league's current season, `None` if unranked.
    pub fn get_league_entry_for_player(
        &self,
        player_id: PlayerId,
        league: &League,
    ) -> AsyncResult<Option<LeagueEntry>> {
        if league.technical_name.trim().is_empty() {
            return AsyncResult::failed(ServiceError::validation("League has no technical name"));
        }
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        let technical_name = league.technical_name.clone();
        self.tasks.submit("Loading league entry", async move {
            let score = api
                .get_league_season_score_for_player(player_id, &technical_name)
                .await?;
            Ok(score
                .map(|dto| mapper.map_league_season_score(&dto))
                .transpose()?)
        })
    }

    // =========================================================================
    // Avatars
    // =========================================================================

    pub fn get_available_avatars(&self) -> AsyncResult<Vec<Avatar>> {
        let server = Arc::clone(&self.server);
        let mapper = Arc::clone(&self.mapper);
        self.tasks.submit("Loading avatars", async move {
            let avatars = server.get_available_avatars().await?;
            map_all(&avatars, |data| mapper.map_avatar(data))
        })
    }

    /// Wear `avatar`; posts [`LobbyEvent::AvatarChanged`] once the selection was
    /// written to the server. Nothing is posted when sending fails.
    pub fn select_avatar(&self, avatar: &Avatar) -> AsyncResult<()> {
        let Some(avatar_id) = avatar.id else {
            return AsyncResult::failed(ServiceError::validation(
                "Cannot select an avatar without an id",
            ));
        };
        let server = Arc::clone(&self.server);
        let events = self.events.clone();
        let avatar = avatar.clone();
        self.tasks.submit("Selecting avatar", async move {
            server.select_avatar(avatar_id).await?;
            tracing::info!(avatar_id = %avatar_id, "Avatar selected");
            events.post(LobbyEvent::AvatarChanged { avatar });
            Ok(())
        })
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    pub fn save_game_review(&self, review: &Review, game_id: GameId) -> AsyncResult<Review> {
        if game_id.value() <= 0 {
            return AsyncResult::failed(ServiceError::validation(format!(
                "Invalid game id {}",
                game_id
            )));
        }
        self.save_review(ReviewKind::Game, game_id.to_string(), review)
    }

    pub fn save_map_version_review(
        &self,
        review: &Review,
        map_version_id: &MapVersionId,
    ) -> AsyncResult<Review> {
        if map_version_id.is_blank() {
            return AsyncResult::failed(ServiceError::validation("Map version id is empty"));
        }
        self.save_review(ReviewKind::MapVersion, map_version_id.to_string(), review)
    }

    pub fn save_mod_version_review(
        &self,
        review: &Review,
        mod_version_id: &ModVersionId,
    ) -> AsyncResult<Review> {
        if mod_version_id.is_blank() {
            return AsyncResult::failed(ServiceError::validation("Mod version id is empty"));
        }
        self.save_review(ReviewKind::ModVersion, mod_version_id.to_string(), review)
    }

    pub fn delete_game_review(&self, review: &Review) -> AsyncResult<()> {
        self.delete_review(ReviewKind::Game, review)
    }

    pub fn delete_map_version_review(&self, review: &Review) -> AsyncResult<()> {
        self.delete_review(ReviewKind::MapVersion, review)
    }

    pub fn delete_mod_version_review(&self, review: &Review) -> AsyncResult<()> {
        self.delete_review(ReviewKind::ModVersion, review)
    }

    /// Creates the review when it has no id yet, otherwise updates it.
    fn save_review(&self, kind: ReviewKind, subject_id: String, review: &Review) -> AsyncResult<Review> {
        if let Err(e) = review.validate_for_submission() {
            return AsyncResult::failed(e.into());
        }
        let api = Arc::clone(&self.api);
        let mapper = Arc::clone(&self.mapper);
        let dto = self.mapper.to_review_dto(review);
        let review = review.clone();

        self.tasks.submit("Saving review", async move {
            if review.is_new() {
                let created = api.create_review(kind, &subject_id, &dto).await?;
                let created = mapper.map_review(&created)?;
                tracing::debug!(
                    kind = kind.resource_type(),
                    subject_id = %subject_id,
                    "Review created"
                );
                Ok(created)
            } else {
                api.update_review(kind, &dto).await?;
                tracing::debug!(kind = kind.resource_type(), "Review updated");
                Ok(review)
            }
        })
    }

    fn delete_review(&self, kind: ReviewKind, review: &Review) -> AsyncResult<()> {
        let review_id = match &review.id {
            Some(id) if !id.is_blank() => id.as_str().to_string(),
            _ => {
                return AsyncResult::failed(ServiceError::validation(
                    "Cannot delete a review without an id",
                ))
            }
        };
        let api = Arc::clone(&self.api);
        self.tasks.submit("Deleting review", async move {
            api.delete_review(kind, &review_id).await?;
            tracing::debug!(kind = kind.resource_type(), review_id = %review_id, "Review deleted");
            Ok(())
        })
    }

    // =========================================================================
    // Games
    // =========================================================================

    pub fn host_game(&self, game: &NewGameInfo) -> AsyncResult<GameLaunch> {
        if let Err(e) = validate_new_game(game) {
            return AsyncResult::failed(e);
        }
        let server = Arc::clone(&self.server);
        let mapper = Arc::clone(&self.mapper);
        let game = game.clone();
        self.tasks.submit("Hosting game", async move {
            let launch = server.host_game(&game).await?;
            let launch = mapper.map_game_launch(&launch);
            tracing::info!(uid = %launch.uid, featured_mod = %launch.featured_mod, "Game hosted");
            Ok(launch)
        })
    }
}

fn validate_new_game(game: &NewGameInfo) -> Result<(), ServiceError> {
    if game.title.trim().is_empty() {
        return Err(ServiceError::validation("Game title is empty"));
    }
    if game.map_name.trim().is_empty() {
        return Err(ServiceError::validation("No map selected"));
    }
    if game.featured_mod.trim().is_empty() {
        return Err(ServiceError::validation("No featured mod selected"));
    }
    if let (Some(min), Some(max)) = (game.min_rating, game.max_rating) {
        if min > max {
            return Err(ServiceError::validation(format!(
                "Minimum rating {} is above maximum rating {}",
                min, max
            )));
        }
    }
    Ok(())
}

/// Map every element, keeping order; the first failure fails the whole batch.
fn map_all<D, T>(
    items: &[D],
    map: impl Fn(&D) -> Result<T, MappingError>,
) -> Result<Vec<T>, ServiceError> {
    items
        .iter()
        .map(|item| map(item).map_err(ServiceError::from))
        .collect()
}
