use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Unique token id. Two tokens for the same user never collide.
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("token lifetime of {0} overflows the expiry timestamp")]
    ExpiryOutOfRange(Duration),
}

/// Signs and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` expiring `ttl` from now.
    pub fn issue(&self, user_id: i32) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange(self.ttl))?;
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Checks signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret.as_bytes(), Duration::hours(24))
    }

    #[test]
    fn test_token_generation_and_verification() {
        let issuer = issuer("test_secret_for_gen_verify");
        let token = issuer.issue(1).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, 1);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_tokens_for_same_user_are_distinct() {
        let issuer = issuer("test_secret_for_distinct");
        let first = issuer.issue(1).unwrap();
        let second = issuer.issue(1).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_token_expiration() {
        let issuer = issuer("test_secret_for_expiration");
        let two_hours_ago = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let expired = issuer
            .sign(&Claims {
                sub: 2,
                iat: two_hours_ago - 60,
                exp: two_hours_ago,
                jti: Uuid::new_v4().to_string(),
            })
            .unwrap();

        match issuer.verify(&expired) {
            Err(TokenError::Invalid(e)) => {
                assert!(matches!(e.kind(), ErrorKind::ExpiredSignature))
            }
            other => panic!("expected expired token to be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = issuer("one_secret").issue(3).unwrap();

        match issuer("a_completely_different_secret").verify(&token) {
            Err(TokenError::Invalid(e)) => {
                assert!(matches!(e.kind(), ErrorKind::InvalidSignature))
            }
            other => panic!("expected signature mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_issue_with_oversized_ttl_fails() {
        let issuer = TokenIssuer::new(b"secret", Duration::MAX);
        assert!(matches!(
            issuer.issue(1),
            Err(TokenError::ExpiryOutOfRange(_))
        ));
    }

    #[test]
    fn test_malformed_token() {
        let result = issuer("secret").verify("um.token.qualquer.invalido");
        assert!(matches!(result, Err(TokenError::Invalid(_))));

        let result = issuer("secret").verify("not-a-jwt");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }
}
