//! Composition root.
//!
//! Builds the adapters for the configured [`Profile`], wires them to the
//! ports and hands out the services the UI layer talks to. Nothing outside
//! this module names a concrete adapter.

use std::sync::Arc;

use tokio::runtime::Handle;

use lobby_domain::{LobbyEvent, MapSummary};

use crate::application::{
    ApiDtoMapper, CreateGameForm, DtoMapper, GamePreferences, LeaderboardService,
    LiveLeaderboardService, LobbyService, MockLeaderboardService, TaskService,
};
use crate::config::{ClientConfig, Profile, RatingConfig};
use crate::infrastructure::messaging::EventBus;
use crate::infrastructure::{HttpApiAccessor, LobbyServerClient, OfflineAccessor};
use crate::ports::outbound::{ApiAccessor, ServerAccessor};

/// The services of one client process.
#[derive(Clone)]
pub struct Services {
    pub lobby: LobbyService,
    pub leaderboard: Arc<dyn LeaderboardService>,
    pub events: EventBus<LobbyEvent>,
    pub tasks: TaskService,
    pub profile: Profile,
    rating: RatingConfig,
}

impl Services {
    /// Wire the services for `config.profile`, running work on `runtime`.
    pub fn for_profile(config: &ClientConfig, runtime: Handle) -> Self {
        let tasks = TaskService::new(runtime, config.max_concurrent_tasks);
        let events = EventBus::new();
        let mapper: Arc<dyn DtoMapper> = Arc::new(ApiDtoMapper::new());

        let (server, api): (Arc<dyn ServerAccessor>, Arc<dyn ApiAccessor>) = match config.profile
        {
            Profile::Online => {
                let server: Arc<dyn ServerAccessor> = Arc::new(LobbyServerClient::new(
                    config.server_url.as_str(),
                    config.request_timeout_ms,
                ));
                let api: Arc<dyn ApiAccessor> = Arc::new(HttpApiAccessor::new(
                    config.api_url.as_str(),
                    config.request_timeout_ms,
                ));
                (server, api)
            }
            Profile::Offline => {
                let offline = Arc::new(OfflineAccessor::new());
                let server: Arc<dyn ServerAccessor> = offline.clone();
                let api: Arc<dyn ApiAccessor> = offline;
                (server, api)
            }
        };

        let lobby = LobbyService::new(server, api, mapper, events.clone(), tasks.clone());
        let leaderboard: Arc<dyn LeaderboardService> = match config.profile {
            Profile::Online => Arc::new(LiveLeaderboardService::new(lobby.clone())),
            Profile::Offline => Arc::new(MockLeaderboardService::new(tasks.clone())),
        };

        tracing::info!(
            profile = %config.profile,
            api_url = %config.api_url,
            server_url = %config.server_url,
            "Lobby services ready"
        );

        Self {
            lobby,
            leaderboard,
            events,
            tasks,
            profile: config.profile,
            rating: config.rating,
        }
    }

    /// A host-game form over `maps`, with the configured rating bounds.
    pub fn create_game_form(
        &self,
        maps: Vec<MapSummary>,
        preferences: GamePreferences,
    ) -> CreateGameForm {
        CreateGameForm::new(maps, self.rating.to_range(), preferences)
    }
}
