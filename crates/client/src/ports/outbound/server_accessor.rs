//! Lobby server port (stateful websocket session).

use async_trait::async_trait;

use lobby_domain::{AvatarId, NewGameInfo};
use lobby_shared::{AvatarData, GameLaunchData};

use crate::application::ServiceError;

/// Commands and queries against the lobby server session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServerAccessor: Send + Sync {
    /// Make `avatar_id` the avatar shown next to the player's name.
    async fn select_avatar(&self, avatar_id: AvatarId) -> Result<(), ServiceError>;

    async fn get_available_avatars(&self) -> Result<Vec<AvatarData>, ServiceError>;

    /// Ask the server to host a game; resolves once the server says to launch it.
    async fn host_game(&self, game: &NewGameInfo) -> Result<GameLaunchData, ServiceError>;
}
