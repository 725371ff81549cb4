//! Error types for core_store

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in entity store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// User not present in the store
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Post not present in the store
    #[error("Post not found: {0}")]
    PostNotFound(String),
}
