//! Registration, login, identity lookup and token refresh.
//!
//! [`AuthService`] ties together the user repository, the credential hasher
//! and the token issuer. All failures surface as [`AuthError`]; the HTTP layer
//! decides which status each kind becomes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::password::{CredentialHasher, PasswordError};
use crate::auth::token::{TokenError, TokenIssuer};
use crate::models::{NewUser, PublicUser, UserProfile};
use crate::repository::{RepositoryError, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email is already registered")]
    UserAlreadyRegistered,

    /// Unknown email and wrong password are reported identically.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    /// Malformed, expired and badly signed tokens all collapse into this kind.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(TokenError),
}

/// A freshly issued token together with the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: CredentialHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::UserAlreadyRegistered);
        }

        let password_hash = self.hasher.hash(password).await?;
        let created = self
            .users
            .create(NewUser {
                email: email.to_owned(),
                name: name.to_owned(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration of the same email.
                RepositoryError::UniqueViolation => AuthError::UserAlreadyRegistered,
                other => AuthError::Repository(other),
            })?;

        log::info!("registered user {}", created.id);
        let token = self.issue(created.id)?;
        Ok(AuthResponse {
            token,
            user: created.into(),
        })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                log::warn!("rejected login attempt");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let matches = match self.hasher.verify(password, &user.password_hash).await {
            Ok(matches) => matches,
            Err(PasswordError::Verify(e)) => {
                log::error!("stored password hash for user {} is unusable: {}", user.id, e);
                false
            }
            Err(e) => return Err(e.into()),
        };
        if !matches {
            log::warn!("rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        log::info!("user {} logged in", user.id);
        let token = self.issue(user.id)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<UserProfile, AuthError> {
        self.users
            .find_profile_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Reloads the caller's identity once their token has been verified.
    pub async fn get_user_from_token_payload(&self, user_id: i32) -> Result<UserProfile, AuthError> {
        self.get_user_by_id(user_id).await
    }

    /// Verifies `old_token` and issues a new one for the same user.
    pub fn refresh_token(&self, old_token: &str) -> Result<String, AuthError> {
        let claims = self.verify(old_token)?;
        log::debug!("refreshing token for user {}", claims.sub);
        self.issue(claims.sub)
    }

    /// Resolves a bearer token to the current profile of its user.
    pub async fn authenticate(&self, token: &str) -> Result<UserProfile, AuthError> {
        let claims = self.verify(token)?;
        self.get_user_from_token_payload(claims.sub).await
    }

    fn verify(&self, token: &str) -> Result<crate::auth::Claims, AuthError> {
        self.tokens.verify(token).map_err(|e| {
            log::debug!("token rejected: {}", e);
            AuthError::InvalidToken
        })
    }

    fn issue(&self, user_id: i32) -> Result<String, AuthError> {
        self.tokens.issue(user_id).map_err(AuthError::Token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRecord;
    use crate::repository::{InMemoryUserRepository, RepositoryResult};
    use async_trait::async_trait;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    const SECRET: &[u8] = b"auth-service-test-secret";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, Duration::hours(1))
    }

    fn service_with(users: Arc<dyn UserRepository>) -> AuthService {
        AuthService::new(users, CredentialHasher::new(4), issuer())
    }

    fn fresh() -> (Arc<InMemoryUserRepository>, AuthService) {
        let users = Arc::new(InMemoryUserRepository::new());
        let service = service_with(users.clone());
        (users, service)
    }

    #[actix_rt::test]
    async fn test_register_user_returns_token_and_public_user() {
        let (users, service) = fresh();

        let result = service
            .register_user("usuario@exemplo.teste", "senha", "Usuário Exemplo")
            .await
            .unwrap();

        assert!(!result.token.is_empty());
        assert_eq!(
            result.user,
            PublicUser {
                id: 1,
                email: "usuario@exemplo.teste".to_string(),
                name: "Usuário Exemplo".to_string(),
            }
        );
        assert_eq!(users.count().await, 1);
        assert_eq!(issuer().verify(&result.token).unwrap().sub, 1);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["user"].get("password").is_none());
        assert!(json["user"].get("password_hash").is_none());
    }

    #[actix_rt::test]
    async fn test_register_user_stores_hash_not_password() {
        let (users, service) = fresh();
        service.register_user("a@x.com", "plaintext", "A").await.unwrap();

        let stored = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert!(stored.password_hash != "plaintext");
        assert!(bcrypt::verify("plaintext", &stored.password_hash).unwrap());
    }

    #[actix_rt::test]
    async fn test_register_user_twice_fails() {
        let (users, service) = fresh();
        service.register_user("email.existente@test.com", "pw1", "First").await.unwrap();

        let second = service.register_user("email.existente@test.com", "pw2", "Second").await;
        assert!(matches!(second, Err(AuthError::UserAlreadyRegistered)));
        assert_eq!(users.count().await, 1);
    }

    /// Reports every email as free, then rejects the insert like a unique index would.
    struct RacingUserRepository;

    #[async_trait]
    impl UserRepository for RacingUserRepository {
        async fn find_by_email(&self, _email: &str) -> RepositoryResult<Option<UserRecord>> {
            Ok(None)
        }

        async fn find_profile_by_id(&self, _id: i32) -> RepositoryResult<Option<UserProfile>> {
            Ok(None)
        }

        async fn create(&self, _user: NewUser) -> RepositoryResult<UserRecord> {
            Err(RepositoryError::UniqueViolation)
        }
    }

    #[actix_rt::test]
    async fn test_register_race_maps_unique_violation() {
        let service = service_with(Arc::new(RacingUserRepository));
        let result = service.register_user("race@x.com", "pw", "Racer").await;
        assert!(matches!(result, Err(AuthError::UserAlreadyRegistered)));
    }

    #[actix_rt::test]
    async fn test_login_user_returns_token() {
        let (_, service) = fresh();
        let registered = service.register_user("u@x.com", "senha", "U").await.unwrap();

        let result = service.login_user("u@x.com", "senha").await.unwrap();
        assert!(!result.token.is_empty());
        assert_eq!(result.user, registered.user);
    }

    #[actix_rt::test]
    async fn test_login_failures_are_indistinguishable() {
        let (_, service) = fresh();
        service.register_user("known@x.com", "right", "Known").await.unwrap();

        let unknown = service.login_user("nobody@x.com", "right").await.unwrap_err();
        let wrong = service.login_user("known@x.com", "senhaIncorreta456").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[actix_rt::test]
    async fn test_login_with_corrupt_stored_hash_is_rejected() {
        let (users, service) = fresh();
        users
            .create(NewUser {
                email: "corrupt@x.com".to_string(),
                name: "Corrupt".to_string(),
                password_hash: "invalidhashformat".to_string(),
            })
            .await
            .unwrap();

        let result = service.login_user("corrupt@x.com", "anything").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[actix_rt::test]
    async fn test_get_user_by_id() {
        let (_, service) = fresh();
        let registered = service.register_user("id@x.com", "pw", "Id").await.unwrap();

        let profile = service.get_user_by_id(registered.user.id).await.unwrap();
        assert_eq!(profile.id, registered.user.id);
        assert_eq!(profile.email, "id@x.com");
        assert_eq!(profile.name, "Id");

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password").is_none());
        assert!(json["createdAt"].is_string());
    }

    #[actix_rt::test]
    async fn test_get_user_by_id_not_found() {
        let (_, service) = fresh();
        let result = service.get_user_by_id(999).await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[actix_rt::test]
    async fn test_get_user_from_token_payload() {
        let (_, service) = fresh();
        let registered = service.register_user("t@x.com", "pw", "T").await.unwrap();

        let by_payload = service
            .get_user_from_token_payload(registered.user.id)
            .await
            .unwrap();
        let by_id = service.get_user_by_id(registered.user.id).await.unwrap();
        assert_eq!(by_payload, by_id);
    }

    #[actix_rt::test]
    async fn test_refresh_token_issues_new_token() {
        let (_, service) = fresh();
        let old = issuer().issue(1).unwrap();

        let new = service.refresh_token(&old).unwrap();
        assert_ne!(new, old);
        assert_eq!(issuer().verify(&new).unwrap().sub, 1);
    }

    #[actix_rt::test]
    async fn test_refresh_token_rejects_invalid_tokens() {
        let (_, service) = fresh();

        let malformed = service.refresh_token("um.token.qualquer.invalido");
        assert!(matches!(malformed, Err(AuthError::InvalidToken)));

        let foreign = TokenIssuer::new(b"other-secret", Duration::hours(1)).issue(1).unwrap();
        assert!(matches!(service.refresh_token(&foreign), Err(AuthError::InvalidToken)));

        let expired = TokenIssuer::new(SECRET, Duration::hours(-2)).issue(1).unwrap();
        assert!(matches!(service.refresh_token(&expired), Err(AuthError::InvalidToken)));
    }

    #[actix_rt::test]
    async fn test_authenticate() {
        let (_, service) = fresh();
        let registered = service.register_user("auth@x.com", "pw", "Auth").await.unwrap();

        let profile = service.authenticate(&registered.token).await.unwrap();
        assert_eq!(profile.id, registered.user.id);

        let orphan = issuer().issue(4242).unwrap();
        assert!(matches!(
            service.authenticate(&orphan).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            service.authenticate("garbage").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
