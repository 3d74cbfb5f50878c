//! In-process messaging: the lobby event bus and connection state.

pub mod connection;
pub mod event_bus;

pub use connection::{set_connection_state, ConnectionState, ConnectionStateObserver};
pub use event_bus::{EventBus, Subscription};
