//! Transport contract between the feed coordinator and the backend.
//!
//! One request per call, no retries, no batching, no interpretation of
//! payload semantics. Implementations only move entities across the
//! process boundary and report how that failed.

use crate::core_gateway::errors::GatewayResult;
use crate::core_store::model::{Post, PostId, User, UserId};
use async_trait::async_trait;

/// Remote create/read/update/delete contract for feed entities
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Fetch every user record known to the backend
    async fn fetch_users(&self) -> GatewayResult<Vec<User>>;

    /// Fetch every post record known to the backend
    async fn fetch_posts(&self) -> GatewayResult<Vec<Post>>;

    /// Create a user; returns the record as the backend stored it
    async fn create_user(&self, user: &User) -> GatewayResult<User>;

    /// Replace a user; returns the record as the backend stored it
    async fn update_user(&self, id: &UserId, user: &User) -> GatewayResult<User>;

    /// Create a post; returns the record as the backend stored it
    async fn create_post(&self, post: &Post) -> GatewayResult<Post>;

    /// Replace a post; returns the record as the backend stored it
    async fn update_post(&self, id: &PostId, post: &Post) -> GatewayResult<Post>;

    /// Delete a post; no response body
    async fn delete_post(&self, id: &PostId) -> GatewayResult<()>;
}
