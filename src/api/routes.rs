//! API routes

use crate::api::handlers::{create_post, get_post, health_check, list_posts, AppState};
use crate::auth::handlers::{get_user, login, register};
use crate::auth::middleware::authenticate;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Build the API routes
pub fn build_api_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/users", post(register))
        .route("/auth/login", post(login))
        .route("/login", post(login))
        .route("/health", get(health_check));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/auth/user", get(get_user))
        .route("/user", get(get_user))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
