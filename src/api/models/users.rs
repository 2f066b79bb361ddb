use crate::db::models::User;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reference to a post owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRef {
    pub id: String,
}

/// Public view of a user; there is no password field to leak
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub posts: Vec<PostRef>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            posts: user
                .post_ids
                .into_iter()
                .map(|id| PostRef { id })
                .collect(),
        }
    }
}
