//! Service layer error types
//!
//! Every failure a facade operation can report falls into one of three
//! families: the caller passed something invalid, talking to a remote
//! collaborator failed, or the remote answered with a payload that cannot be
//! turned into a domain value.

use lobby_domain::DomainError;
use lobby_shared::JsonApiError;

/// Errors that can occur in service operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    /// A required argument was missing or invalid; no remote call was made
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The remote call failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The remote answered, but the payload could not be mapped
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// The work was dropped before it produced an outcome
    #[error("Operation was cancelled")]
    Cancelled,
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ServiceError::Transport(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ServiceError::Mapping(_))
    }
}

impl From<DomainError> for ServiceError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) | DomainError::Parse(msg) => ServiceError::Validation(msg),
        }
    }
}

impl From<JsonApiError> for ServiceError {
    fn from(e: JsonApiError) -> Self {
        let entity = match &e {
            JsonApiError::UnexpectedType { expected, .. } => expected.clone(),
            JsonApiError::Decode { resource_type, .. }
            | JsonApiError::Encode { resource_type, .. } => resource_type.clone(),
            JsonApiError::Malformed(_) => "document".to_string(),
        };
        ServiceError::Mapping(MappingError {
            entity,
            reason: e.to_string(),
        })
    }
}

/// Failure to reach a remote collaborator or to get a well-formed answer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("No reply within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Server rejected the request: {0}")]
    Rejected(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Not connected to server")]
    NotConnected,
}

/// A remote payload that does not describe a valid domain value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot map {entity}: {reason}")]
pub struct MappingError {
    pub entity: String,
    pub reason: String,
}

impl MappingError {
    pub fn missing(entity: &str, field: &str) -> Self {
        Self {
            entity: entity.to_string(),
            reason: format!("missing required field '{}'", field),
        }
    }

    pub fn invalid(entity: &str, field: &str, detail: impl std::fmt::Display) -> Self {
        Self {
            entity: entity.to_string(),
            reason: format!("invalid field '{}': {}", field, detail),
        }
    }
}
