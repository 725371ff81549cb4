//! Error types for core_feed

use crate::core_gateway::errors::GatewayError;
use crate::core_session::errors::SessionError;
use crate::core_store::model::{PostId, UserId};
use thiserror::Error;

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors surfaced by feed operations.
///
/// Validation variants are reported before any remote call and leave no
/// state change behind. Transport failures arrive after the optimistic
/// local change has been rolled back; the client stays usable.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Operation requires a bound session
    #[error("No session is bound")]
    SessionRequired,

    /// Post not known to the entity store
    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    /// User not known to the entity store
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Friend target equals the caller's own identity
    #[error("Cannot add yourself as a friend")]
    SelfFriendship,

    /// Friend target is already in the friend list
    #[error("Already friends with {0}")]
    AlreadyFriends(UserId),

    /// A local user already holds this username
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// The remote call failed; any optimistic change was rolled back
    #[error("Transport error: {0}")]
    Transport(#[from] GatewayError),

    /// Session manager failure (credentials or slot)
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl FeedError {
    /// True for precondition failures that never reached the gateway
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FeedError::SessionRequired
                | FeedError::PostNotFound(_)
                | FeedError::UserNotFound(_)
                | FeedError::SelfFriendship
                | FeedError::AlreadyFriends(_)
                | FeedError::UsernameTaken(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(FeedError::SessionRequired.is_validation());
        assert!(FeedError::SelfFriendship.is_validation());
        assert!(
            !FeedError::Transport(GatewayError::Network("down".to_string())).is_validation()
        );
        assert!(!FeedError::Session(SessionError::InvalidCredentials).is_validation());
    }

    #[test]
    fn test_gateway_error_converts() {
        let err: FeedError = GatewayError::Server { status: 500 }.into();
        assert!(matches!(
            err,
            FeedError::Transport(GatewayError::Server { status: 500 })
        ));
    }
}
