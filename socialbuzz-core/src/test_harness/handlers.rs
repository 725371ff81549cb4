//! HTTP handlers for the backend harness

use super::state::HarnessState;
use crate::core_store::model::{Post, User};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error body returned by the harness
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler-level error carrying a status code
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(what: &str, id: &str) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!("{} not found: {}", what, id),
        }
    }

    fn injected_fault() -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "injected fault".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn check_faults(state: &HarnessState) -> ApiResult<()> {
    if state.mutations_failing() {
        Err(ApiError::injected_fault())
    } else {
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Users
// ----------------------------------------------------------------------

/// GET /users
pub async fn list_users(State(state): State<HarnessState>) -> Json<Vec<User>> {
    Json(state.users.read().await.values().cloned().collect())
}

/// POST /users
pub async fn create_user(
    State(state): State<HarnessState>,
    Json(user): Json<User>,
) -> ApiResult<Json<User>> {
    check_faults(&state)?;
    state
        .users
        .write()
        .await
        .insert(user.id.to_string(), user.clone());
    Ok(Json(user))
}

/// PUT /users/:id
pub async fn update_user(
    State(state): State<HarnessState>,
    Path(id): Path<String>,
    Json(user): Json<User>,
) -> ApiResult<Json<User>> {
    check_faults(&state)?;

    let mut users = state.users.write().await;
    if !users.contains_key(&id) {
        return Err(ApiError::not_found("User", &id));
    }
    users.insert(id, user.clone());
    Ok(Json(user))
}

// ----------------------------------------------------------------------
// Posts
// ----------------------------------------------------------------------

/// GET /posts
pub async fn list_posts(State(state): State<HarnessState>) -> Json<Vec<Post>> {
    Json(state.posts.read().await.values().cloned().collect())
}

/// POST /posts
pub async fn create_post(
    State(state): State<HarnessState>,
    Json(post): Json<Post>,
) -> ApiResult<Json<Post>> {
    check_faults(&state)?;
    state
        .posts
        .write()
        .await
        .insert(post.id.to_string(), post.clone());
    Ok(Json(post))
}

/// PUT /posts/:id
pub async fn update_post(
    State(state): State<HarnessState>,
    Path(id): Path<String>,
    Json(post): Json<Post>,
) -> ApiResult<Json<Post>> {
    check_faults(&state)?;

    let mut posts = state.posts.write().await;
    if !posts.contains_key(&id) {
        return Err(ApiError::not_found("Post", &id));
    }
    posts.insert(id, post.clone());
    Ok(Json(post))
}

/// DELETE /posts/:id
pub async fn delete_post(
    State(state): State<HarnessState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    check_faults(&state)?;

    state.posts.write().await.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}
