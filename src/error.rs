use thiserror::Error;

use crate::actor_framework::FrameworkError;

pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors returned by every marketplace service.
///
/// All variants are recoverable by the caller; nothing in the core panics on
/// bad input or illegal state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid state transition: {0}")]
    InvalidState(String),
    #[error("Invalid fields: {0}")]
    InvalidFields(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Email already registered")]
    EmailTaken,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Edit window exceeded")]
    EditWindowOver,
    #[error("Order not completed")]
    OrderNotDone,
    #[error("Credential error: {0}")]
    Credential(String),
    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}

/// Coarse outcome classes a transport layer can map onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFamily {
    Missing,
    Denied,
    Conflict,
    BadInput,
    Unauthenticated,
    Internal,
}

impl MarketError {
    pub fn status_family(&self) -> StatusFamily {
        match self {
            MarketError::NotFound(_) => StatusFamily::Missing,
            MarketError::Forbidden(_) => StatusFamily::Denied,
            MarketError::InvalidState(_)
            | MarketError::AlreadyExists(_)
            | MarketError::EmailTaken
            | MarketError::EditWindowOver
            | MarketError::OrderNotDone => StatusFamily::Conflict,
            MarketError::InvalidFields(_) | MarketError::Validation(_) => StatusFamily::BadInput,
            MarketError::Unauthorized => StatusFamily::Unauthenticated,
            MarketError::Credential(_) | MarketError::ActorCommunication(_) => {
                StatusFamily::Internal
            }
        }
    }
}

impl From<FrameworkError> for MarketError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => MarketError::NotFound(id),
            FrameworkError::AlreadyExists(key) => MarketError::AlreadyExists(key),
            other => MarketError::ActorCommunication(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framework_errors_map_onto_domain_kinds() {
        assert_eq!(
            MarketError::from(FrameworkError::NotFound("o1".into())),
            MarketError::NotFound("o1".into())
        );
        assert_eq!(
            MarketError::from(FrameworkError::ActorDropped),
            MarketError::ActorCommunication("Actor dropped".into())
        );
    }

    #[test]
    fn status_families_are_stable() {
        assert_eq!(MarketError::EmailTaken.status_family(), StatusFamily::Conflict);
        assert_eq!(
            MarketError::Forbidden("x".into()).status_family(),
            StatusFamily::Denied
        );
        assert_eq!(
            MarketError::Unauthorized.status_family(),
            StatusFamily::Unauthenticated
        );
    }
}
