pub mod posts;
pub mod system;

pub use posts::*;
pub use system::*;

use crate::auth::jwt::{generate_secret, TokenIssuer};
use crate::auth::password::PasswordHasher;
use crate::auth::service::AuthService;
use crate::core::config::SecurityConfig;
use crate::core::error::{PostlineError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::repository::{PostRepository, PostStore, UserRepository, UserStore};
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub auth: AuthService,
    /// Mark the access token cookie `Secure`
    pub cookie_secure: bool,
}

impl AppState {
    /// Wire repositories and the auth service over one database
    pub fn new(db: Arc<DatabaseManager>, security: &SecurityConfig) -> Result<Self> {
        security
            .validate()
            .map_err(|e| PostlineError::ConfigError(e.to_string()))?;

        let ttl = i64::try_from(security.token_ttl)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                PostlineError::ConfigError(format!(
                    "token_ttl {} is out of range",
                    security.token_ttl
                ))
            })?;

        let secret = if security.jwt_secret.is_empty() {
            tracing::warn!(
                "No jwt_secret configured, generated a random one; tokens will not survive a restart"
            );
            generate_secret()
        } else {
            security.jwt_secret.as_bytes().to_vec()
        };

        let hasher = PasswordHasher::new(security.bcrypt_cost);
        let tokens = TokenIssuer::new(&secret, ttl);

        let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db.clone(), hasher));
        let posts: Arc<dyn PostStore> = Arc::new(PostRepository::new(db.clone()));
        let auth = AuthService::new(users.clone(), hasher, tokens);

        Ok(Self {
            db,
            users,
            posts,
            auth,
            cookie_secure: security.cookie_secure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MAX_TOKEN_TTL;

    fn security(token_ttl: u64) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "state-test-secret".to_string(),
            token_ttl,
            bcrypt_cost: 4,
            cookie_secure: true,
            allowed_origins: vec!["*".to_string()],
        }
    }

    fn db() -> Arc<DatabaseManager> {
        Arc::new(DatabaseManager::new_in_memory().unwrap())
    }

    #[test]
    fn test_token_ttl_reaches_issuer() {
        let state = AppState::new(db(), &security(MAX_TOKEN_TTL)).unwrap();
        assert_eq!(
            state.auth.tokens().ttl().num_seconds(),
            MAX_TOKEN_TTL as i64
        );
    }

    #[test]
    fn test_out_of_range_token_ttl_is_rejected() {
        for ttl in [0, MAX_TOKEN_TTL + 1, 100_000_000_000_000_000, u64::MAX] {
            let result = AppState::new(db(), &security(ttl));
            assert!(
                matches!(result, Err(PostlineError::ConfigError(_))),
                "ttl {ttl}"
            );
        }
    }

    #[test]
    fn test_empty_secret_still_issues_verifiable_tokens() {
        let mut config = security(300);
        config.jwt_secret = String::new();

        let state = AppState::new(db(), &config).unwrap();
        let token = state.auth.tokens().issue("user-1").unwrap();

        assert_eq!(state.auth.tokens().verify(&token).unwrap().id, "user-1");
    }
}
