use crate::api::extract::JsonBody;
use crate::api::handlers::AppState;
use crate::api::models::{CreatePostRequest, PostResponse};
use crate::api::validation::ensure_valid;
use crate::auth::middleware::CurrentUser;
use crate::core::error::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Handler for POST /posts - Publish a post as the authenticated user
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> Result<impl IntoResponse> {
    ensure_valid(&req)?;
    let message = req.message.unwrap_or_default();

    let post = state.posts.create(&message, &user.id).await?;

    tracing::info!(post_id = %post.id, user_id = %user.id, "Post created");
    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// Handler for GET /posts - Posts written by the authenticated user
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    let posts = state.posts.find_many_by_author(&user.id).await?;

    let response: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(Json(response))
}

/// Handler for GET /posts/:id - A single post by id
///
/// Any authenticated user may read any post.
pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let post = state.posts.find_by_id(&id).await?;
    Ok(Json(PostResponse::from(post)))
}
