//! Lobby client core.
//!
//! This crate contains the remote-data facade the lobby UI talks to, the
//! offline variant used without a server, and the infrastructure adapters for
//! the lobby API (HTTP) and the lobby server (websocket). The variant in force
//! is picked once at start-up by [`config::Profile`], see [`composition`].

pub mod application;
pub mod composition;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::{AsyncResult, Completer, ServiceError, TaskService};
pub use composition::Services;
pub use config::{ClientConfig, Profile};
