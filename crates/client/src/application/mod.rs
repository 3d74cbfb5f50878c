//! Application layer: the facade services and the machinery they run on.

pub mod async_result;
pub mod error;
pub mod game_setup;
pub mod mapper;
pub mod services;
pub mod tasks;

pub use async_result::{AsyncResult, Completer};
pub use error::{MappingError, ServiceError, TransportError};
pub use game_setup::{CreateGameForm, GamePreferences, NavigationKey, RatingRange};
pub use mapper::{ApiDtoMapper, DtoMapper};
pub use services::{
    LeaderboardService, LiveLeaderboardService, LobbyService, MockLeaderboardService,
};
pub use tasks::{TaskInfo, TaskService};
