//! SocialBuzz client core
//!
//! In-memory state manager for a social feed client: users, posts,
//! friendships and the session identity, with every mutation mediated
//! through an optimistic-update-then-reconcile protocol against a
//! remote backend.
//!
//! The components, leaf-first:
//! - [`core_gateway`]: transport contract to the backend, HTTP impl
//! - [`core_store`]: the entity store, single shared mutable state
//! - [`core_session`]: session identity and its durable slot
//! - [`core_feed`]: the mutation coordinator orchestrating the above

pub mod config;
pub mod core_feed;
pub mod core_gateway;
pub mod core_session;
pub mod core_store;
pub mod logging;
pub mod metrics;
pub mod test_harness;

pub use config::Config;
pub use core_feed::{FeedCoordinator, FeedError, FeedResult};
pub use core_gateway::{FeedTransport, GatewayError, HttpGateway};
pub use core_session::{SessionManager, SessionSnapshot};
pub use core_store::model::{Post, PostId, User, UserId};
pub use core_store::EntityStore;
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogLevel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Ensure the main exports are accessible
        let _ = LogLevel::Info;
        let _ = UserId::generate();
    }
}
