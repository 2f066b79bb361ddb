//! Password hashing and verification using bcrypt

use crate::core::error::{PostlineError, Result};
use tokio::task;

/// Salted one-way password hashing
///
/// bcrypt is deliberately slow, so both operations run on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| PostlineError::TaskError(format!("Hashing task panicked: {}", e)))?
            .map_err(PostlineError::from)
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed hash counts as a mismatch rather than an error.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        let verified = task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| PostlineError::TaskError(format!("Verification task panicked: {}", e)))?;

        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::debug!(error = %e, "Stored password hash could not be parsed");
                Ok(false)
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = PasswordHasher::new(TEST_COST);
        let hash = hasher.hash("test123").await.unwrap();

        assert!(hasher.verify("test123", &hash).await.unwrap());
        assert!(!hasher.verify("test124", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_salt_is_random() {
        let hasher = PasswordHasher::new(TEST_COST);
        let first = hasher.hash("same-password").await.unwrap();
        let second = hasher.hash("same-password").await.unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same-password", &first).await.unwrap());
        assert!(hasher.verify("same-password", &second).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_a_mismatch() {
        let hasher = PasswordHasher::new(TEST_COST);

        assert!(!hasher.verify("test123", "not-a-bcrypt-hash").await.unwrap());
        assert!(!hasher.verify("test123", "").await.unwrap());
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(8))]

        #[test]
        fn prop_verify_accepts_only_the_original(password in "[a-zA-Z0-9]{1,32}") {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let hasher = PasswordHasher::new(TEST_COST);
                let hash = hasher.hash(&password).await.unwrap();

                assert!(hasher.verify(&password, &hash).await.unwrap());
                let altered = format!("{}x", password);
                assert!(!hasher.verify(&altered, &hash).await.unwrap());
            });
        }
    }
}
