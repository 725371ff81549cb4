//! Server state for the backend harness
//!
//! Plain in-memory store of record for users and posts, shared across
//! requests. A fault toggle lets tests turn every mutation route into a
//! server error to exercise rollback paths.

use crate::core_store::model::{Post, User};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Harness state shared across requests
#[derive(Clone, Default)]
pub struct HarnessState {
    /// User records keyed by id
    pub users: Arc<RwLock<HashMap<String, User>>>,

    /// Post records keyed by id
    pub posts: Arc<RwLock<HashMap<String, Post>>>,

    /// When set, every mutation route answers 500
    fail_mutations: Arc<AtomicBool>,
}

impl HarnessState {
    /// Create empty harness state
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the mutation fault
    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Whether mutation routes currently fail
    pub fn mutations_failing(&self) -> bool {
        self.fail_mutations.load(Ordering::SeqCst)
    }

    /// Seed a user directly, bypassing HTTP
    pub async fn seed_user(&self, user: User) {
        self.users.write().await.insert(user.id.to_string(), user);
    }

    /// Seed a post directly, bypassing HTTP
    pub async fn seed_post(&self, post: Post) {
        self.posts.write().await.insert(post.id.to_string(), post);
    }
}
