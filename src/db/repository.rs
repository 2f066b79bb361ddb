//! Repository pattern implementation for data access layer
//!
//! One store trait per entity, each with a SQLite-backed implementation.
//! Handlers and the auth flow only ever see the traits.

use crate::auth::password::PasswordHasher;
use crate::core::error::{PostlineError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{Post, User};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Persistence operations over users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Hash the password and insert a new user. Fails with
    /// `DuplicateUser` if the email is taken, leaving the table untouched.
    async fn create(&self, email: &str, password: &str) -> Result<User>;

    /// Find a user by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a user by id, with the ids of their posts attached
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;
}

/// Persistence operations over posts
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post owned by `author_id`. Length bounds are checked upstream.
    async fn create(&self, message: &str, author_id: &str) -> Result<Post>;

    /// Find any post by id, regardless of owner
    async fn find_by_id(&self, id: &str) -> Result<Post>;

    /// All posts owned by `author_id`, in insertion order
    async fn find_many_by_author(&self, author_id: &str) -> Result<Vec<Post>>;
}

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";
const POST_COLUMNS: &str = "id, message, author_id, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        post_ids: Vec::new(),
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        message: row.get(1)?,
        author_id: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn post_ids_for(conn: &Connection, author_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT id FROM posts WHERE author_id = ? ORDER BY rowid")?;
    let ids = stmt
        .query_map([author_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(ids)
}

/// True when the error is the UNIQUE index on `users.email` firing
fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Repository for User entities
pub struct UserRepository {
    db: Arc<DatabaseManager>,
    hasher: PasswordHasher,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(db: Arc<DatabaseManager>, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?))
            .await
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = self.hasher.hash(password).await?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
            post_ids: Vec::new(),
        };

        let record = user.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, email, password_hash, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?)",
                    rusqlite::params![
                        &record.id,
                        &record.email,
                        &record.password_hash,
                        &record.created_at,
                        &record.updated_at,
                    ],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        PostlineError::DuplicateUser
                    } else {
                        PostlineError::DatabaseError(e)
                    }
                })?;
                Ok(())
            })
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
                        [&email],
                        user_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = id.to_string();
        // Read the user and their post ids from one snapshot
        self.db
            .transaction(move |tx| {
                let user = tx
                    .query_row(
                        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                        [&id],
                        user_from_row,
                    )
                    .optional()?;

                match user {
                    Some(mut user) => {
                        user.post_ids = post_ids_for(tx, &user.id)?;
                        Ok(Some(user))
                    }
                    None => Ok(None),
                }
            })
            .await
    }
}

/// Repository for Post entities
pub struct PostRepository {
    db: Arc<DatabaseManager>,
}

impl PostRepository {
    /// Create a new PostRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn create(&self, message: &str, author_id: &str) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            author_id: author_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        let record = post.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO posts (id, message, author_id, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?)",
                    rusqlite::params![
                        &record.id,
                        &record.message,
                        &record.author_id,
                        &record.created_at,
                        &record.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await?;

        Ok(post)
    }

    async fn find_by_id(&self, id: &str) -> Result<Post> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"),
                    [&id],
                    post_from_row,
                )
                .optional()?
                .ok_or(PostlineError::PostNotFound)
            })
            .await
    }

    async fn find_many_by_author(&self, author_id: &str) -> Result<Vec<Post>> {
        let author_id = author_id.to_string();
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {POST_COLUMNS} FROM posts WHERE author_id = ? ORDER BY rowid"
                ))?;

                let posts = stmt
                    .query_map([&author_id], post_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                Ok(posts)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (UserRepository, PostRepository) {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        (
            UserRepository::new(db.clone(), PasswordHasher::new(4)),
            PostRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let (users, _) = setup();

        let user = users.create("test@email.com", "test123").await.unwrap();

        assert_eq!(user.email, "test@email.com");
        assert_ne!(user.password_hash, "test123");
        assert!(user.password_hash.starts_with("$2"));

        let stored = users.find_by_email("test@email.com").await.unwrap().unwrap();
        assert_eq!(stored.id, user.id);
        assert_eq!(stored.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_without_writes() {
        let (users, _) = setup();

        let first = users.create("dup@email.com", "test123").await.unwrap();
        let second = users.create("dup@email.com", "other456").await;

        assert!(matches!(second, Err(PostlineError::DuplicateUser)));
        assert_eq!(users.count().await.unwrap(), 1);

        let stored = users.find_by_email("dup@email.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let (users, _) = setup();
        users.create("Mixed@Email.com", "test123").await.unwrap();

        assert!(users.find_by_email("mixed@email.com").await.unwrap().is_none());
        assert!(users.find_by_email("Mixed@Email.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_user_by_id_attaches_post_ids() {
        let (users, posts) = setup();
        let user = users.create("author@email.com", "test123").await.unwrap();

        let first = posts.create("first", &user.id).await.unwrap();
        let second = posts.create("second", &user.id).await.unwrap();

        let loaded = users.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(loaded.post_ids, vec![first.id, second.id]);

        assert!(users.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_lookup_by_id() {
        let (users, posts) = setup();
        let user = users.create("author@email.com", "test123").await.unwrap();

        let created = posts.create("hello", &user.id).await.unwrap();
        let found = posts.find_by_id(&created.id).await.unwrap();

        assert_eq!(found.message, "hello");
        assert_eq!(found.author_id, user.id);

        let missing = posts.find_by_id("00000000-0000-0000-0000-000000000000").await;
        assert!(matches!(missing, Err(PostlineError::PostNotFound)));
    }

    #[tokio::test]
    async fn test_listing_is_scoped_to_author() {
        let (users, posts) = setup();
        let alice = users.create("alice@email.com", "test123").await.unwrap();
        let bob = users.create("bob@email.com", "test123").await.unwrap();

        let a1 = posts.create("a1", &alice.id).await.unwrap();
        let b1 = posts.create("b1", &bob.id).await.unwrap();
        let a2 = posts.create("a2", &alice.id).await.unwrap();

        let alice_posts = posts.find_many_by_author(&alice.id).await.unwrap();
        let ids: Vec<_> = alice_posts.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![a1.id, a2.id]);

        let bob_posts = posts.find_many_by_author(&bob.id).await.unwrap();
        assert_eq!(bob_posts.len(), 1);
        assert_eq!(bob_posts[0].id, b1.id);

        // Bob can still read Alice's post by id
        assert!(posts.find_by_id(&ids[0]).await.is_ok());
    }

    #[tokio::test]
    async fn test_listing_empty_author() {
        let (users, posts) = setup();
        let user = users.create("quiet@email.com", "test123").await.unwrap();

        let listed = posts.find_many_by_author(&user.id).await.unwrap();
        assert!(listed.is_empty());
    }
}
