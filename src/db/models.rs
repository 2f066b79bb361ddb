//! Database models
//!
//! Internal records as stored. These are never serialized onto the wire
//! directly; see `api::models` for the public projections.

use chrono::{DateTime, Utc};

/// User record in the database
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ids of the posts this user authored, in insertion order.
    /// Only populated by lookups by id.
    pub post_ids: Vec<String>,
}

/// Post record in the database
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub message: String,
    /// Id of the owning user; fixed at creation
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
