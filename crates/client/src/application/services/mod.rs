//! Application services.

pub mod leaderboard_service;
pub mod lobby_service;
pub mod mock_leaderboard_service;

pub use leaderboard_service::{LeaderboardService, LiveLeaderboardService};
pub use lobby_service::LobbyService;
pub use mock_leaderboard_service::MockLeaderboardService;
