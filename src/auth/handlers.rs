//! Authentication API handlers

use crate::api::extract::JsonBody;
use crate::api::handlers::AppState;
use crate::api::models::UserResponse;
use crate::api::validation::ensure_valid;
use crate::auth::middleware::{access_token_cookie, CurrentUser};
use crate::auth::models::{LoginRequest, RegisterRequest};
use crate::core::error::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

/// Handler for POST /users - User registration
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    ensure_valid(&req)?;
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    tracing::info!(email = %email, "User registration attempt");

    let user = state.users.create(&email, &password).await?;

    tracing::info!(user_id = %user.id, "User registered successfully");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Handler for POST /auth/login - Exchange credentials for an access token cookie
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse> {
    ensure_valid(&req)?;
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    tracing::info!(email = %email, "Login attempt");

    let token = state.auth.login(&email, &password).await?;
    let cookie = access_token_cookie(
        &token,
        state.auth.tokens().ttl().num_seconds(),
        state.cookie_secure,
    )?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// Handler for GET /auth/user - The authenticated user's public record
pub async fn get_user(CurrentUser(user): CurrentUser) -> Result<impl IntoResponse> {
    Ok(Json(UserResponse::from(user)))
}
