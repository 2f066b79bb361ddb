//! JWT token generation and validation

use crate::core::error::{PostlineError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to
    pub id: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// Reasons an incoming token is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("token could not be parsed")]
    Malformed,
}

/// Issues and verifies stateless HS256 access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a user, stamped with the current time
    pub fn issue(&self, user_id: &str) -> Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String> {
        let issued_at = now.timestamp();
        let expires_at = issued_at
            .checked_add(self.ttl.num_seconds())
            .ok_or_else(|| PostlineError::TokenSigning("token expiry overflows".to_string()))?;
        let claims = Claims {
            id: user_id.to_string(),
            iat: issued_at,
            exp: expires_at,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PostlineError::TokenSigning(e.to_string()))
    }

    /// Verify signature and expiry against the current time
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and expiry as if the current time were `now`.
    ///
    /// A token is valid strictly before its `exp`.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Claims, TokenError> {
        // Expiry is checked below against the supplied clock, without leeway
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::Invalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Generate a random signing secret for deployments that did not configure one
pub fn generate_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret", Duration::minutes(5))
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = issuer();
        let token = issuer.issue("user-1").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.id, "user-1");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_expiry_boundary() {
        let issuer = issuer();
        let issued = epoch();
        let token = issuer.issue_at("user-1", issued).unwrap();

        let just_before = issued + Duration::seconds(299);
        let at_ttl = issued + Duration::seconds(300);
        let after_ttl = issued + Duration::seconds(301);

        assert!(issuer.verify_at(&token, just_before).is_ok());
        assert_eq!(issuer.verify_at(&token, at_ttl), Err(TokenError::Expired));
        assert_eq!(issuer.verify_at(&token, after_ttl), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = issuer().issue("user-1").unwrap();
        let other = TokenIssuer::new(b"other-secret", Duration::minutes(5));

        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let issuer = issuer();
        let token = issuer.issue("user-1").unwrap();
        let forged_claims = issuer.issue("user-2").unwrap();

        // Splice user-2's payload onto user-1's signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_claims.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(issuer.verify(&forged), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let issuer = issuer();
        let token = issuer.issue("user-1").unwrap();

        let (body, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { "B" } else { "A" };
        let forged = format!("{}.{}{}", body, flipped, &signature[1..]);

        assert_eq!(issuer.verify(&forged), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let issuer = issuer();

        assert_eq!(issuer.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(issuer.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let first = generate_secret();
        let second = generate_secret();

        assert_eq!(first.len(), 32);
        assert_ne!(first, second);
    }
}
