//! Login and identity resolution

use crate::auth::jwt::TokenIssuer;
use crate::auth::password::PasswordHasher;
use crate::core::error::{PostlineError, Result};
use crate::db::models::User;
use crate::db::repository::UserStore;
use std::sync::Arc;

/// Orchestrates credential checks and token issuance
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Check email and password and issue an access token.
    ///
    /// An unknown email is `UserNotFound`; a wrong password is
    /// `InvalidCredentials` and no token is minted.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(PostlineError::UserNotFound)?;

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(PostlineError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.id)?;
        tracing::info!(user_id = %user.id, "Login successful");

        Ok(token)
    }

    /// Turn a presented token into the user it was issued to.
    ///
    /// Every failure, including a user deleted since issuance, collapses to
    /// `Unauthorized`.
    pub async fn resolve_identity(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(reason = %e, "Token rejected");
            PostlineError::Unauthorized
        })?;

        match self.users.find_by_id(&claims.id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::debug!(user_id = %claims.id, "Token subject no longer exists");
                Err(PostlineError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::manager::DatabaseManager;
    use crate::db::repository::UserRepository;
    use chrono::{Duration, Utc};

    const SECRET: &[u8] = b"auth-service-secret";

    async fn setup() -> (AuthService, Arc<DatabaseManager>, User) {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let hasher = PasswordHasher::new(4);
        let users = Arc::new(UserRepository::new(db.clone(), hasher));
        let user = users.create("test@email.com", "test123").await.unwrap();

        let service = AuthService::new(
            users,
            hasher,
            TokenIssuer::new(SECRET, Duration::minutes(5)),
        );
        (service, db, user)
    }

    #[tokio::test]
    async fn test_login_issues_token_for_user() {
        let (service, _db, user) = setup().await;

        let token = service.login("test@email.com", "test123").await.unwrap();
        let claims = service.tokens().verify(&token).unwrap();

        assert_eq!(claims.id, user.id);
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_not_found() {
        let (service, _db, _user) = setup().await;

        let result = service.login("nobody@email.com", "test123").await;
        assert!(matches!(result, Err(PostlineError::UserNotFound)));

        // Even with a password that would match somebody else
        let result = service.login("nobody@email.com", "wrong").await;
        assert!(matches!(result, Err(PostlineError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _db, _user) = setup().await;

        let result = service.login("test@email.com", "wrong-password").await;
        assert!(matches!(result, Err(PostlineError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_resolve_identity() {
        let (service, _db, user) = setup().await;
        let token = service.login("test@email.com", "test123").await.unwrap();

        let resolved = service.resolve_identity(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, "test@email.com");
    }

    #[tokio::test]
    async fn test_resolve_identity_rejects_bad_tokens() {
        let (service, _db, user) = setup().await;

        let garbage = service.resolve_identity("garbage").await;
        assert!(matches!(garbage, Err(PostlineError::Unauthorized)));

        let foreign = TokenIssuer::new(b"someone-else", Duration::minutes(5))
            .issue(&user.id)
            .unwrap();
        let result = service.resolve_identity(&foreign).await;
        assert!(matches!(result, Err(PostlineError::Unauthorized)));

        let stale = service
            .tokens()
            .issue_at(&user.id, Utc::now() - Duration::minutes(6))
            .unwrap();
        let result = service.resolve_identity(&stale).await;
        assert!(matches!(result, Err(PostlineError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_resolve_identity_deleted_user() {
        let (service, db, user) = setup().await;
        let token = service.login("test@email.com", "test123").await.unwrap();

        let id = user.id.clone();
        db.execute(move |conn| {
            conn.execute("DELETE FROM users WHERE id = ?", [&id])?;
            Ok(())
        })
        .await
        .unwrap();

        let result = service.resolve_identity(&token).await;
        assert!(matches!(result, Err(PostlineError::Unauthorized)));
    }
}
