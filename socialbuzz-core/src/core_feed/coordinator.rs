/*
    coordinator.rs - Mutation coordinator

    Every caller-issued mutation runs the same skeleton:
    validate -> apply optimistic local change -> remote call -> reconcile
    or roll back. The entity store is written here and in core_session
    only; callers never mutate it directly.

    Mutations targeting the same entity are serialized through a
    per-entity lock map: a second operation on the same post or user
    waits until the prior one's reconciliation (success or rollback) has
    completed. Cross-entity operations interleave freely.
*/

use crate::core_feed::errors::{FeedError, FeedResult};
use crate::core_gateway::transport::FeedTransport;
use crate::core_session::session_manager::{SessionManager, SessionSnapshot};
use crate::core_store::entity_store::EntityStore;
use crate::core_store::model::{Post, PostId, User, UserId};
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Per-entity lock map. Holding a guard serializes every mutation that
/// targets the same entity id.
struct EntityLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EntityLocks {
    fn new() -> Self {
        EntityLocks {
            inner: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().await;
            map.entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }
}

/// Orchestrates all feed operations against the entity store, the
/// session manager and the remote gateway
pub struct FeedCoordinator {
    store: Arc<EntityStore>,
    gateway: Arc<dyn FeedTransport>,
    session: Arc<SessionManager>,
    entity_locks: EntityLocks,
}

impl FeedCoordinator {
    /// Create a new coordinator
    ///
    /// # Arguments
    ///
    /// * `store` - Entity store, the single shared mutable state
    /// * `gateway` - Remote transport to the backend
    /// * `session` - Session manager owning the durable identity slot
    pub fn new(
        store: Arc<EntityStore>,
        gateway: Arc<dyn FeedTransport>,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            store,
            gateway,
            session,
            entity_locks: EntityLocks::new(),
        }
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// Currently bound identity, if any
    pub async fn session(&self) -> Option<SessionSnapshot> {
        self.session.current().await
    }

    /// Full post sequence
    pub async fn posts(&self) -> Vec<Post> {
        self.store.posts().await
    }

    /// Full user sequence
    pub async fn users(&self) -> Vec<User> {
        self.store.users().await
    }

    /// Current unsent post text
    pub async fn draft(&self) -> String {
        self.store.draft().await
    }

    /// Overwrite the unsent post text
    pub async fn set_draft(&self, text: impl Into<String>) {
        self.store.set_draft(text.into()).await;
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Restore the session from the durable slot. A malformed or absent
    /// slot leaves the client anonymous.
    pub async fn restore_session(&self) -> FeedResult<Option<SessionSnapshot>> {
        Ok(self.session.restore().await?)
    }

    /// Register a new account.
    ///
    /// The username check against local users is best effort only;
    /// system-wide uniqueness is enforced by the backend. There is no
    /// optimistic effect, so a failed remote call leaves nothing to undo.
    pub async fn register(&self, username: &str, secret: &str) -> FeedResult<User> {
        counter!("feed.operations.total").increment(1);

        if self.store.find_user_by_username(username).await.is_some() {
            counter!("feed.operations.failed").increment(1);
            return Err(FeedError::UsernameTaken(username.to_string()));
        }

        let user = User::new(username.to_string(), secret.to_string());
        info!(user_id = %user.id, username = %username, "Registering user");

        let created = self.gateway.create_user(&user).await.map_err(|e| {
            counter!("feed.operations.failed").increment(1);
            FeedError::from(e)
        })?;

        self.store.upsert_user(created.clone()).await;
        Ok(created)
    }

    /// Log in by exact username+secret match against the local user set.
    /// Pure local operation; no remote call.
    pub async fn login(&self, username: &str, secret: &str) -> FeedResult<SessionSnapshot> {
        counter!("feed.operations.total").increment(1);

        let users = self.store.users().await;
        let snapshot = self.session.login(&users, username, secret).await.map_err(|e| {
            counter!("feed.operations.failed").increment(1);
            FeedError::from(e)
        })?;

        Ok(snapshot)
    }

    /// Clear the session and its durable slot
    pub async fn logout(&self) -> FeedResult<()> {
        counter!("feed.operations.total").increment(1);
        info!("Logging out");
        Ok(self.session.logout().await?)
    }

    /// Submit the current draft as a new post by the bound identity.
    ///
    /// The post does not exist locally before confirmation, so there is
    /// no optimistic effect. On success the returned post is upserted
    /// and the draft cleared; on failure the draft is retained so the
    /// caller may retry.
    pub async fn create_post(&self) -> FeedResult<Post> {
        counter!("feed.operations.total").increment(1);

        let snapshot = self.require_session().await?;

        // The author must be resolvable locally so the post never enters
        // the store referencing an unknown user.
        let author = self.store.user(&snapshot.user_id).await.map_err(|_| {
            counter!("feed.operations.failed").increment(1);
            FeedError::UserNotFound(snapshot.user_id.clone())
        })?;

        let text = self.store.draft().await;
        let post = Post::new(author.id.clone(), text);
        info!(post_id = %post.id, author = %post.author, "Creating post");

        match self.gateway.create_post(&post).await {
            Ok(created) => {
                self.store.upsert_post(created.clone()).await;
                self.store.clear_draft().await;
                Ok(created)
            }
            Err(e) => {
                // Draft is kept for retry.
                counter!("feed.operations.failed").increment(1);
                Err(e.into())
            }
        }
    }

    /// Like a post: optimistic local increment, then accept the server
    /// counter as authoritative. Returns the reconciled like count.
    pub async fn like_post(&self, id: &PostId) -> FeedResult<u64> {
        counter!("feed.operations.total").increment(1);
        let _guard = self.entity_locks.acquire(&id.0).await;

        let before = self.store.post(id).await.map_err(|_| {
            counter!("feed.operations.failed").increment(1);
            FeedError::PostNotFound(id.clone())
        })?;

        // Optimistic local effect, paired with `before` as its inverse.
        let optimistic = before.with_incremented_likes();
        self.store.upsert_post(optimistic.clone()).await;
        debug!(post_id = %id, likes = optimistic.likes, "Optimistic like applied");

        match self.gateway.update_post(id, &optimistic).await {
            Ok(server_post) => {
                if server_post.id != *id
                    || self.store.user(&server_post.author).await.is_err()
                {
                    // The mutation took effect remotely; keep the
                    // optimistic state rather than rolling back.
                    counter!("feed.reconciliations.kept").increment(1);
                    warn!(
                        post_id = %id,
                        response_id = %server_post.id,
                        response_author = %server_post.author,
                        "Reconciliation mismatch on like, keeping local state"
                    );
                    return Ok(optimistic.likes);
                }

                // Re-check existence: a refresh may have dropped the post
                // while the call was in flight.
                if self.store.post(id).await.is_err() {
                    warn!(post_id = %id, "Post vanished during like, skipping reconcile");
                    return Ok(server_post.likes);
                }

                self.store.upsert_post(server_post.clone()).await;
                Ok(server_post.likes)
            }
            Err(e) => {
                self.rollback_post(id, before).await;
                counter!("feed.operations.failed").increment(1);
                Err(e.into())
            }
        }
    }

    /// Delete a post: optimistic local removal, re-inserted on failure
    pub async fn delete_post(&self, id: &PostId) -> FeedResult<()> {
        counter!("feed.operations.total").increment(1);
        let _guard = self.entity_locks.acquire(&id.0).await;

        // Removal doubles as the precondition check; the removed post is
        // the recorded inverse.
        let removed = self.store.remove_post(id).await.ok_or_else(|| {
            counter!("feed.operations.failed").increment(1);
            FeedError::PostNotFound(id.clone())
        })?;
        info!(post_id = %id, "Optimistically removed post");

        match self.gateway.delete_post(id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                counter!("feed.rollbacks.total").increment(1);
                warn!(post_id = %id, error = %e, "Delete failed, re-inserting post");
                self.store.upsert_post(removed).await;
                counter!("feed.operations.failed").increment(1);
                Err(e.into())
            }
        }
    }

    /// Add a friend to the bound identity.
    ///
    /// Confirm-then-apply: the friend list is only mutated after the
    /// backend acknowledges the update, so there is nothing to roll back
    /// on failure.
    pub async fn add_friend(&self, target: &UserId) -> FeedResult<User> {
        counter!("feed.operations.total").increment(1);

        let snapshot = self.require_session().await?;
        if *target == snapshot.user_id {
            counter!("feed.operations.failed").increment(1);
            return Err(FeedError::SelfFriendship);
        }

        let _guard = self.entity_locks.acquire(&snapshot.user_id.0).await;

        let me = self.store.user(&snapshot.user_id).await.map_err(|_| {
            counter!("feed.operations.failed").increment(1);
            FeedError::UserNotFound(snapshot.user_id.clone())
        })?;

        if me.is_friend(target) {
            counter!("feed.operations.failed").increment(1);
            return Err(FeedError::AlreadyFriends(target.clone()));
        }

        if self.store.user(target).await.is_err() {
            counter!("feed.operations.failed").increment(1);
            return Err(FeedError::UserNotFound(target.clone()));
        }

        let updated = me.with_friend(target.clone());
        info!(user_id = %me.id, friend = %target, "Adding friend");

        let server_user = self
            .gateway
            .update_user(&me.id, &updated)
            .await
            .map_err(|e| {
                counter!("feed.operations.failed").increment(1);
                FeedError::from(e)
            })?;

        self.store.upsert_user(server_user.clone()).await;
        self.session
            .rebind(SessionSnapshot::of(&server_user))
            .await?;

        Ok(server_user)
    }

    /// Pull the authoritative user and post sets from the backend and
    /// replace local state. Posts whose author is unknown after the user
    /// pass are skipped.
    pub async fn refresh(&self) -> FeedResult<()> {
        counter!("feed.operations.total").increment(1);

        let users = self.gateway.fetch_users().await.map_err(|e| {
            counter!("feed.operations.failed").increment(1);
            FeedError::from(e)
        })?;
        let posts = self.gateway.fetch_posts().await.map_err(|e| {
            counter!("feed.operations.failed").increment(1);
            FeedError::from(e)
        })?;

        let known: std::collections::HashSet<&UserId> = users.iter().map(|u| &u.id).collect();
        let (kept, skipped): (Vec<Post>, Vec<Post>) =
            posts.into_iter().partition(|p| known.contains(&p.author));

        for post in &skipped {
            warn!(post_id = %post.id, author = %post.author, "Skipping post with unknown author");
        }

        info!(
            users = users.len(),
            posts = kept.len(),
            skipped = skipped.len(),
            "Refreshed from backend"
        );

        self.store.replace_users(users).await;
        self.store.replace_posts(kept).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn require_session(&self) -> FeedResult<SessionSnapshot> {
        self.session.current().await.ok_or_else(|| {
            counter!("feed.operations.failed").increment(1);
            FeedError::SessionRequired
        })
    }

    /// Restore the recorded pre-mutation snapshot of a post. Skipped if
    /// the post vanished in the meantime (late rollback against a
    /// refreshed store).
    async fn rollback_post(&self, id: &PostId, before: Post) {
        counter!("feed.rollbacks.total").increment(1);
        if self.store.post(id).await.is_ok() {
            warn!(post_id = %id, likes = before.likes, "Rolling back to pre-call state");
            self.store.upsert_post(before).await;
        } else {
            debug!(post_id = %id, "Post vanished before rollback, nothing to restore");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_gateway::errors::{GatewayError, GatewayResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tokio::time::{sleep, Duration};

    /// Scriptable transport: echoes payloads back by default, can be
    /// switched to fail every mutation, and can override the like
    /// counter the "server" reports.
    struct StubTransport {
        fail_mutations: AtomicBool,
        server_likes: AtomicU64,
        override_likes: AtomicBool,
        respond_with_wrong_id: AtomicBool,
        mutation_calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Duration,
    }

    impl StubTransport {
        fn new() -> Self {
            StubTransport {
                fail_mutations: AtomicBool::new(false),
                server_likes: AtomicU64::new(0),
                override_likes: AtomicBool::new(false),
                respond_with_wrong_id: AtomicBool::new(false),
                mutation_calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                delay: Duration::from_millis(0),
            }
        }

        fn with_delay(delay: Duration) -> Self {
            let mut stub = Self::new();
            stub.delay = delay;
            stub
        }

        fn fail_next_mutations(&self, fail: bool) {
            self.fail_mutations.store(fail, Ordering::SeqCst);
        }

        fn report_likes(&self, likes: u64) {
            self.server_likes.store(likes, Ordering::SeqCst);
            self.override_likes.store(true, Ordering::SeqCst);
        }

        async fn enter(&self) -> GatewayResult<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.mutation_calls.fetch_add(1, Ordering::SeqCst);
            sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_mutations.load(Ordering::SeqCst) {
                Err(GatewayError::Network("stubbed outage".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl FeedTransport for StubTransport {
        async fn fetch_users(&self) -> GatewayResult<Vec<User>> {
            Ok(Vec::new())
        }

        async fn fetch_posts(&self) -> GatewayResult<Vec<Post>> {
            Ok(Vec::new())
        }

        async fn create_user(&self, user: &User) -> GatewayResult<User> {
            self.enter().await?;
            Ok(user.clone())
        }

        async fn update_user(&self, _id: &UserId, user: &User) -> GatewayResult<User> {
            self.enter().await?;
            Ok(user.clone())
        }

        async fn create_post(&self, post: &Post) -> GatewayResult<Post> {
            self.enter().await?;
            Ok(post.clone())
        }

        async fn update_post(&self, _id: &PostId, post: &Post) -> GatewayResult<Post> {
            self.enter().await?;
            let mut response = post.clone();
            if self.override_likes.load(Ordering::SeqCst) {
                response.likes = self.server_likes.load(Ordering::SeqCst);
            }
            if self.respond_with_wrong_id.load(Ordering::SeqCst) {
                response.id = PostId::new("not-the-post-you-sent".to_string());
            }
            Ok(response)
        }

        async fn delete_post(&self, _id: &PostId) -> GatewayResult<()> {
            self.enter().await?;
            Ok(())
        }
    }

    struct Fixture {
        coordinator: FeedCoordinator,
        stub: Arc<StubTransport>,
        store: Arc<EntityStore>,
        _slot_dir: TempDir,
    }

    fn fixture_with(stub: StubTransport) -> Fixture {
        let slot_dir = TempDir::new().unwrap();
        let store = Arc::new(EntityStore::new());
        let stub = Arc::new(stub);
        let session = Arc::new(SessionManager::new(slot_dir.path()).unwrap());
        let coordinator =
            FeedCoordinator::new(store.clone(), stub.clone(), session);
        Fixture {
            coordinator,
            stub,
            store,
            _slot_dir: slot_dir,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(StubTransport::new())
    }

    async fn seeded_login(fx: &Fixture) -> User {
        let alice = User::new("alice".to_string(), "pw1".to_string());
        fx.store.upsert_user(alice.clone()).await;
        fx.coordinator.login("alice", "pw1").await.unwrap();
        alice
    }

    /// Seed a post whose author is also known to the store
    async fn seeded_post(fx: &Fixture, text: &str) -> Post {
        let author = User::new(format!("author-of-{}", text), "pw".to_string());
        fx.store.upsert_user(author.clone()).await;
        let post = Post::new(author.id, text.to_string());
        fx.store.upsert_post(post.clone()).await;
        post
    }

    #[tokio::test]
    async fn test_register_upserts_returned_user() {
        let fx = fixture();
        let user = fx.coordinator.register("alice", "pw1").await.unwrap();

        assert_eq!(fx.store.user(&user.id).await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_register_rejects_locally_known_username() {
        let fx = fixture();
        fx.store
            .upsert_user(User::new("alice".to_string(), "other".to_string()))
            .await;

        let err = fx.coordinator.register("alice", "pw1").await.unwrap_err();
        assert!(matches!(err, FeedError::UsernameTaken(_)));
        assert_eq!(fx.stub.mutation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_failure_leaves_no_local_user() {
        let fx = fixture();
        fx.stub.fail_next_mutations(true);

        let err = fx.coordinator.register("alice", "pw1").await.unwrap_err();
        assert!(matches!(err, FeedError::Transport(_)));
        assert!(fx.store.users().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_post_uses_draft_and_clears_it() {
        let fx = fixture();
        let alice = seeded_login(&fx).await;

        fx.coordinator.set_draft("first!").await;
        let post = fx.coordinator.create_post().await.unwrap();

        assert_eq!(post.author, alice.id);
        assert_eq!(post.text, "first!");
        assert_eq!(post.likes, 0);
        assert!(post.comments.is_empty());
        assert_eq!(fx.coordinator.draft().await, "");
        assert_eq!(fx.coordinator.posts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_post_with_empty_text_is_accepted() {
        let fx = fixture();
        seeded_login(&fx).await;

        let post = fx.coordinator.create_post().await.unwrap();
        assert_eq!(post.text, "");
        assert_eq!(post.likes, 0);
    }

    #[tokio::test]
    async fn test_create_post_requires_session() {
        let fx = fixture();
        let err = fx.coordinator.create_post().await.unwrap_err();
        assert!(matches!(err, FeedError::SessionRequired));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_create_post_failure_retains_draft() {
        let fx = fixture();
        seeded_login(&fx).await;

        fx.coordinator.set_draft("do not lose me").await;
        fx.stub.fail_next_mutations(true);

        let err = fx.coordinator.create_post().await.unwrap_err();
        assert!(matches!(err, FeedError::Transport(_)));
        assert_eq!(fx.coordinator.draft().await, "do not lose me");
        assert!(fx.coordinator.posts().await.is_empty());
    }

    #[tokio::test]
    async fn test_like_accepts_server_counter_as_authoritative() {
        let fx = fixture();
        let post = seeded_post(&fx, "hi").await;

        // Another client already pushed the counter to 41; our increment
        // lands as 42 on the server regardless of the local value.
        fx.stub.report_likes(42);

        let likes = fx.coordinator.like_post(&post.id).await.unwrap();
        assert_eq!(likes, 42);
        assert_eq!(fx.store.post(&post.id).await.unwrap().likes, 42);
    }

    #[tokio::test]
    async fn test_like_failure_rolls_back_to_previous_counter() {
        let fx = fixture();
        let mut post = seeded_post(&fx, "hi").await;
        post.likes = 7;
        fx.store.upsert_post(post.clone()).await;

        fx.stub.fail_next_mutations(true);
        let err = fx.coordinator.like_post(&post.id).await.unwrap_err();

        assert!(matches!(err, FeedError::Transport(_)));
        assert_eq!(fx.store.post(&post.id).await.unwrap().likes, 7);
    }

    #[tokio::test]
    async fn test_like_reconciliation_mismatch_keeps_optimistic_state() {
        let fx = fixture();
        let post = seeded_post(&fx, "drift").await;

        // Remote mutation succeeded but the response does not describe
        // the post we sent; the optimistic state stays in place.
        fx.stub.respond_with_wrong_id.store(true, Ordering::SeqCst);
        fx.stub.report_likes(999);

        let likes = fx.coordinator.like_post(&post.id).await.unwrap();
        assert_eq!(likes, 1);
        assert_eq!(fx.store.post(&post.id).await.unwrap().likes, 1);
    }

    #[tokio::test]
    async fn test_like_unknown_post_is_validation_error() {
        let fx = fixture();
        let missing = PostId::generate();

        let err = fx.coordinator.like_post(&missing).await.unwrap_err();
        assert!(matches!(err, FeedError::PostNotFound(_)));
        assert_eq!(fx.stub.mutation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_then_like_fails_with_validation_error() {
        let fx = fixture();
        let post = seeded_post(&fx, "bye").await;

        fx.coordinator.delete_post(&post.id).await.unwrap();

        let err = fx.coordinator.like_post(&post.id).await.unwrap_err();
        assert!(matches!(err, FeedError::PostNotFound(_)));

        let err = fx.coordinator.delete_post(&post.id).await.unwrap_err();
        assert!(matches!(err, FeedError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_failure_reinserts_post() {
        let fx = fixture();
        let post = seeded_post(&fx, "sticky").await;

        fx.stub.fail_next_mutations(true);
        let err = fx.coordinator.delete_post(&post.id).await.unwrap_err();

        assert!(matches!(err, FeedError::Transport(_)));
        assert_eq!(fx.store.post(&post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn test_add_friend_rejects_self_without_gateway_call() {
        let fx = fixture();
        let alice = seeded_login(&fx).await;

        let err = fx.coordinator.add_friend(&alice.id).await.unwrap_err();
        assert!(matches!(err, FeedError::SelfFriendship));
        assert_eq!(fx.stub.mutation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_friend_confirm_then_apply() {
        let fx = fixture();
        let alice = seeded_login(&fx).await;
        let bob = User::new("bob".to_string(), "pw2".to_string());
        fx.store.upsert_user(bob.clone()).await;

        let updated = fx.coordinator.add_friend(&bob.id).await.unwrap();
        assert_eq!(updated.friends, vec![bob.id.clone()]);

        // Store and session snapshot both reflect the confirmed list.
        assert_eq!(fx.store.user(&alice.id).await.unwrap().friends.len(), 1);
        let snapshot = fx.coordinator.session().await.unwrap();
        assert_eq!(snapshot.friends, vec![bob.id.clone()]);

        let err = fx.coordinator.add_friend(&bob.id).await.unwrap_err();
        assert!(matches!(err, FeedError::AlreadyFriends(_)));
    }

    #[tokio::test]
    async fn test_add_friend_failure_leaves_friend_list_untouched() {
        let fx = fixture();
        let alice = seeded_login(&fx).await;
        let bob = User::new("bob".to_string(), "pw2".to_string());
        fx.store.upsert_user(bob.clone()).await;

        fx.stub.fail_next_mutations(true);
        let err = fx.coordinator.add_friend(&bob.id).await.unwrap_err();

        assert!(matches!(err, FeedError::Transport(_)));
        assert!(fx.store.user(&alice.id).await.unwrap().friends.is_empty());
        assert!(fx.coordinator.session().await.unwrap().friends.is_empty());
    }

    #[tokio::test]
    async fn test_add_friend_unknown_target_is_validation_error() {
        let fx = fixture();
        seeded_login(&fx).await;

        let stranger = UserId::generate();
        let err = fx.coordinator.add_friend(&stranger).await.unwrap_err();
        assert!(matches!(err, FeedError::UserNotFound(_)));
        assert_eq!(fx.stub.mutation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_same_entity_mutations_are_serialized() {
        let fx = fixture_with(StubTransport::with_delay(Duration::from_millis(20)));
        let post = seeded_post(&fx, "popular").await;

        let (a, b, c) = tokio::join!(
            fx.coordinator.like_post(&post.id),
            fx.coordinator.like_post(&post.id),
            fx.coordinator.like_post(&post.id),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        // The per-entity lock admits one in-flight call at a time, so the
        // echoing server sees each increment in sequence.
        assert_eq!(fx.stub.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(fx.store.post(&post.id).await.unwrap().likes, 3);
    }

    #[tokio::test]
    async fn test_cross_entity_mutations_may_overlap() {
        let fx = fixture_with(StubTransport::with_delay(Duration::from_millis(20)));
        let one = seeded_post(&fx, "one").await;
        let two = seeded_post(&fx, "two").await;

        let (a, b) = tokio::join!(
            fx.coordinator.like_post(&one.id),
            fx.coordinator.like_post(&two.id),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(fx.stub.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_serialized_likes_converge_to_server_counter() {
        let fx = fixture();
        let post = seeded_post(&fx, "hot-take").await;

        for expected in [10u64, 11, 12] {
            fx.stub.report_likes(expected);
            let likes = fx.coordinator.like_post(&post.id).await.unwrap();
            assert_eq!(likes, expected);
        }

        // Never the sum of uncoordinated local increments.
        assert_eq!(fx.store.post(&post.id).await.unwrap().likes, 12);
    }
}
