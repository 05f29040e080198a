use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::UserProfile;

/// The caller's profile, as resolved by `AuthMiddleware`.
///
/// Only usable on routes behind the middleware; anywhere else extraction fails
/// with `401 Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserProfile);

impl AuthenticatedUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserProfile>().cloned() {
            Some(profile) => ready(Ok(AuthenticatedUser(profile))),
            None => {
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
