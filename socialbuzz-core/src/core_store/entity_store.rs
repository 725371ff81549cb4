/*
    entity_store.rs - In-memory entity store

    Single shared mutable state of the client: users, posts, and the
    working draft of the unsent post. Pure container with O(1) expected
    access; no validation logic lives here. The mutation coordinator and
    the session manager are the only writers.
*/

use crate::core_store::errors::{StoreError, StoreResult};
use crate::core_store::model::{Post, PostId, User, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory mapping of known users and posts
pub struct EntityStore {
    users: RwLock<HashMap<UserId, User>>,
    posts: RwLock<HashMap<PostId, Post>>,
    draft: RwLock<String>,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        EntityStore {
            users: RwLock::new(HashMap::new()),
            posts: RwLock::new(HashMap::new()),
            draft: RwLock::new(String::new()),
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Look up a user by id
    pub async fn user(&self, id: &UserId) -> StoreResult<User> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound(id.to_string()))
    }

    /// Insert or replace a user, keyed by its id
    pub async fn upsert_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    /// Remove a user by id. Removing an absent user is a no-op.
    pub async fn remove_user(&self, id: &UserId) -> Option<User> {
        self.users.write().await.remove(id)
    }

    /// Full read of all known users
    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }

    /// First user matching `username`, if any
    pub async fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    /// Replace the whole user set (refresh from the backend)
    pub async fn replace_users(&self, users: Vec<User>) {
        let mut map = self.users.write().await;
        map.clear();
        for user in users {
            map.insert(user.id.clone(), user);
        }
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    /// Look up a post by id
    pub async fn post(&self, id: &PostId) -> StoreResult<Post> {
        self.posts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::PostNotFound(id.to_string()))
    }

    /// Insert or replace a post, keyed by its id
    pub async fn upsert_post(&self, post: Post) {
        self.posts.write().await.insert(post.id.clone(), post);
    }

    /// Remove a post by id, returning it if it was present. Removing an
    /// absent post is a no-op.
    pub async fn remove_post(&self, id: &PostId) -> Option<Post> {
        self.posts.write().await.remove(id)
    }

    /// Full read of all known posts
    pub async fn posts(&self) -> Vec<Post> {
        self.posts.read().await.values().cloned().collect()
    }

    /// Replace the whole post set (refresh from the backend)
    pub async fn replace_posts(&self, posts: Vec<Post>) {
        let mut map = self.posts.write().await;
        map.clear();
        for post in posts {
            map.insert(post.id.clone(), post);
        }
    }

    // ------------------------------------------------------------------
    // Draft
    // ------------------------------------------------------------------

    /// Current unsent post text
    pub async fn draft(&self) -> String {
        self.draft.read().await.clone()
    }

    /// Overwrite the unsent post text
    pub async fn set_draft(&self, text: String) {
        *self.draft.write().await = text;
    }

    /// Clear the unsent post text
    pub async fn clear_draft(&self) {
        self.draft.write().await.clear();
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
