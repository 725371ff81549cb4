//! Entity models for the feed client

pub mod post;
pub mod types;
pub mod user;

pub use post::Post;
pub use types::{PostId, UserId};
pub use user::User;
