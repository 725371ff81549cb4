//! API routes for the backend harness

use super::handlers;
use super::state::HarnessState;
use axum::{
    routing::{get, put},
    Router,
};

/// Build the REST router the feed client expects
pub fn build_router(state: HarnessState) -> Router {
    Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/:id", put(handlers::update_user))
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/posts/:id",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        .with_state(state)
}
