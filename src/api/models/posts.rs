use crate::api::validation::{self, Validate};
use crate::core::error::FieldError;
use crate::db::models::Post;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted post, in characters
pub const MAX_MESSAGE_LENGTH: usize = 280;

/// Request body for creating a post
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostRequest {
    pub message: Option<String>,
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if validation::not_empty("message", self.message.as_deref(), &mut errors) {
            validation::max_length(
                "message",
                self.message.as_deref().unwrap_or_default(),
                MAX_MESSAGE_LENGTH,
                &mut errors,
            );
        }
        errors
    }
}

/// Public view of a post
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub message: String,
    /// Id of the owning user
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            message: post.message,
            author: post.author_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
