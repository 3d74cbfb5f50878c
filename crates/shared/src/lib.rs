//! Lobby Shared - wire formats owned by the two remote collaborators
//!
//! This crate contains the types that cross the network boundary:
//! - API DTOs, deserialized from JSON:API documents
//! - The JSON:API document codec (flattening resources into DTO JSON)
//! - Lobby server messages (ClientMessage, ServerMessage)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, chrono, and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain IDs** - raw `String`/`i32` identifiers in DTOs; the mapper
//!    in the client converts them

pub mod dto;
pub mod jsonapi;
pub mod messages;

pub use dto::{
    LeaderboardDto, LeaderboardRatingDto, LeagueDto, LeagueSeasonScoreDto, NewsPostDto,
    PlayerDto, ReviewAttributes, ReviewDto, ReviewKind, SubdivisionDto,
};
pub use jsonapi::{ApiResource, JsonApiError};
pub use messages::{AvatarAction, AvatarData, ClientMessage, GameLaunchData, ServerMessage};
