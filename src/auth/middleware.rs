//! Authentication middleware
//!
//! Reads the access token from the `access_token` cookie, resolves it to a
//! user and attaches a [`RequestContext`] to that request only. Routes that
//! are not wrapped in [`authenticate`] never see a context.

use crate::api::handlers::AppState;
use crate::core::error::PostlineError;
use crate::db::models::User;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Identity resolved for the duration of one request
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub identity: Option<User>,
}

impl RequestContext {
    pub fn authenticated(user: User) -> Self {
        Self {
            identity: Some(user),
        }
    }

    /// The resolved user, or `Unauthorized` if there is none
    pub fn require_identity(&self) -> Result<&User, PostlineError> {
        self.identity.as_ref().ok_or(PostlineError::Unauthorized)
    }
}

/// Where a request stands before identity resolution
#[derive(Debug, PartialEq, Eq)]
pub enum Credential {
    NoCredential,
    Presented(String),
}

/// Pull the access token out of the `Cookie` header(s)
pub fn extract_credential(headers: &HeaderMap) -> Credential {
    let prefix = format!("{ACCESS_TOKEN_COOKIE}=");

    let token = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(|token| token.trim_matches('"'))
        .filter(|token| !token.is_empty());

    match token {
        Some(token) => Credential::Presented(token.to_string()),
        None => Credential::NoCredential,
    }
}

/// Build the `Set-Cookie` value that hands a freshly issued token to the client
pub fn access_token_cookie(
    token: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, PostlineError> {
    let mut cookie = format!(
        "{ACCESS_TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| PostlineError::TokenSigning(format!("Token is not a valid cookie value: {}", e)))
}

/// Gate for protected routes
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_credential(request.headers()) {
        Credential::Presented(token) => token,
        Credential::NoCredential => {
            tracing::debug!("No access token presented");
            return PostlineError::Unauthorized.into_response();
        }
    };

    let user = match state.auth.resolve_identity(&token).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    request
        .extensions_mut()
        .insert(RequestContext::authenticated(user));

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = PostlineError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Extractor for handlers that need the authenticated user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = PostlineError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = RequestContext::from_request_parts(parts, state).await?;
        context.require_identity().cloned().map(CurrentUser)
    }
}
