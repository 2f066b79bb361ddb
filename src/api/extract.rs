//! JSON body extraction
//!
//! Unlike `axum::Json`, an empty body is read as `T::default()` so that a
//! request with no body reaches validation and gets field-level messages.

use crate::core::error::PostlineError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// A request body parsed as JSON, defaulting when empty
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = PostlineError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|e| PostlineError::InvalidRequest(e.body_text()))?;

        parse_body(&body).map(JsonBody)
    }
}

fn parse_body<T>(body: &[u8]) -> Result<T, PostlineError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| PostlineError::InvalidRequest(format!("Malformed JSON body: {}", e)))
}
