//! Error types for core_session

use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur in session management
#[derive(Error, Debug)]
pub enum SessionError {
    /// Username/secret pair matched no known user. Deliberately does not
    /// distinguish unknown user from wrong secret.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The durable slot could not be read or written
    #[error("Session slot error: {0}")]
    Slot(#[from] std::io::Error),

    /// The snapshot could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        // Same message whichever field failed to match
        let err = SessionError::InvalidCredentials;
        assert_eq!(err.to_string(), "Invalid username or password");
    }
}
