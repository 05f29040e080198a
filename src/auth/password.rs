use bcrypt::{hash, verify};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(bcrypt::BcryptError),

    #[error("failed to verify password: {0}")]
    Verify(bcrypt::BcryptError),

    #[error("password worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// bcrypt hashing with a fixed cost.
///
/// Both operations run on the blocking pool so a slow hash never stalls the
/// worker serving other requests.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await?
            .map_err(PasswordError::Hash)
    }

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash is
    /// unusable.
    pub async fn verify(&self, password: &str, hashed: &str) -> Result<bool, PasswordError> {
        let password = password.to_owned();
        let hashed = hashed.to_owned();
        tokio::task::spawn_blocking(move || verify(password, &hashed))
            .await?
            .map_err(PasswordError::Verify)
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
