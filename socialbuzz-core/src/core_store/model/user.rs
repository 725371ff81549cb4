/*
    user.rs - User model

    Represents an account known to the client.

    Wire shape (backend JSON):
    - id: client-generated at registration
    - username: unique across the system, enforced by the backend
    - password: plaintext credential secret; matching happens in
      core_session only, never here
    - friends: ordered list of user ids, no duplicates, no self-reference
*/

use super::types::UserId;
use serde::{Deserialize, Serialize};

/// Account record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: UserId,

    /// Unique username
    pub username: String,

    /// Credential secret, carried as the backend stores it
    pub password: String,

    /// Ordered friend list
    #[serde(default)]
    pub friends: Vec<UserId>,
}

impl User {
    /// Create a new user with a freshly generated id and no friends
    pub fn new(username: String, password: String) -> Self {
        User {
            id: UserId::generate(),
            username,
            password,
            friends: Vec::new(),
        }
    }

    /// Whether `other` is already in the friend list
    pub fn is_friend(&self, other: &UserId) -> bool {
        self.friends.contains(other)
    }

    /// Copy of this user with `friend` appended to the friend list.
    ///
    /// Callers are responsible for the self-reference and duplicate
    /// checks; this is a pure data transform used to build the payload
    /// sent to the backend before any local state changes.
    pub fn with_friend(&self, friend: UserId) -> Self {
        let mut updated = self.clone();
        updated.friends.push(friend);
        updated
    }
}
