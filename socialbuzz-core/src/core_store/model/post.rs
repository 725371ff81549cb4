/*
    post.rs - Post model

    Represents a single feed post.

    Wire shape (backend JSON):
    - id: client-generated at submission
    - userId: author, must reference a known user
    - text: body, may be empty
    - likes: non-negative counter, only ever moved by the like operation
    - comments: preserved opaquely; this client never mutates them
*/

use super::types::{PostId, UserId};
use serde::{Deserialize, Serialize};

/// Feed post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique post ID
    pub id: PostId,

    /// Author of the post
    #[serde(rename = "userId")]
    pub author: UserId,

    /// Text body
    pub text: String,

    /// Like counter
    #[serde(default)]
    pub likes: u64,

    /// Comment payloads, round-tripped untouched
    #[serde(default)]
    pub comments: Vec<serde_json::Value>,
}

impl Post {
    /// Create a new post with a freshly generated id, zero likes and no
    /// comments
    pub fn new(author: UserId, text: String) -> Self {
        Post {
            id: PostId::generate(),
            author,
            text,
            likes: 0,
            comments: Vec::new(),
        }
    }

    /// Copy of this post with the like counter bumped by one.
    ///
    /// Pure data transform; the coordinator owns when the result becomes
    /// visible and when it is rolled back.
    pub fn with_incremented_likes(&self) -> Self {
        let mut updated = self.clone();
        updated.likes = updated.likes.saturating_add(1);
        updated
    }
}
