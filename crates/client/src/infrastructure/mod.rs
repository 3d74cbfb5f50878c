//! Infrastructure adapters for the outbound ports.

pub mod http_api;
pub mod messaging;
pub mod offline;
pub mod websocket;

pub use http_api::HttpApiAccessor;
pub use offline::OfflineAccessor;
pub use websocket::LobbyServerClient;
