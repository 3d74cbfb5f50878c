//! Connection lifecycle state.
//!
//! The lobby server connection is opened lazily by the websocket client; its
//! state lives in an `AtomicU8` so observers can read it without locking.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Connection state of the lobby server session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to the server
    Disconnected,
    /// Attempting to establish connection
    Connecting,
    /// Successfully connected
    Connected,
    /// The last connection attempt failed
    Failed,
}

impl ConnectionState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Failed => 3,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Observable connection state for UI binding.
///
/// Multiple observers can share the same underlying state.
#[derive(Clone)]
pub struct ConnectionStateObserver {
    state: Arc<AtomicU8>,
}

impl ConnectionStateObserver {
    pub fn new(state: Arc<AtomicU8>) -> Self {
        Self { state }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Internal helper to update connection state.
pub fn set_connection_state(state_ref: &AtomicU8, new_state: ConnectionState) {
    state_ref.store(new_state.to_u8(), Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_roundtrip() {
        let states = [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Failed,
        ];

        for state in states {
            assert_eq!(ConnectionState::from_u8(state.to_u8()), state);
        }
    }

    #[test]
    fn test_observer_reads_state() {
        let state = Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8()));
        let observer = ConnectionStateObserver::new(Arc::clone(&state));

        assert!(!observer.is_connected());

        set_connection_state(&state, ConnectionState::Connected);

        assert_eq!(observer.state(), ConnectionState::Connected);
        assert!(observer.is_connected());
    }
}
