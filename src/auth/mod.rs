pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::CredentialHasher;
pub use token::{Claims, TokenIssuer};

lazy_static! {
    // Display names: letters (any script), spaces, apostrophes, dots and hyphens.
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[\p{L}\p{M}][\p{L}\p{M}' .\-]*$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Between 1 and 100 characters.
    #[validate(
        length(min = 1, max = 100),
        regex(
            path = "NAME_REGEX",
            message = "Name may only contain letters, spaces, apostrophes, dots or hyphens"
        )
    )]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// bcrypt only considers the first 72 bytes, so longer input is refused.
    #[validate(length(min = 4, max = 72))]
    pub password: String,
}

/// Body of a token refresh request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

/// A newly issued token on its own, as returned by refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
