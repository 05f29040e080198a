use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::error::AppError;
use crate::services::{AuthError, AuthService};

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: [&str; 4] = [
    "/health",
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/refresh",
];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| *public == path)
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Verifies the bearer token and stores the caller's `UserProfile` in the
/// request extensions for `AuthenticatedUser` to pick up.
///
/// Requires `web::Data<AuthService>` in the app data.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(req.path()) {
            return Box::pin(self.service.call(req));
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let auth = req
                .app_data::<web::Data<AuthService>>()
                .cloned()
                .ok_or_else(|| {
                    log::error!("AuthService missing from app data");
                    AppError::InternalServerError("Authentication unavailable".into())
                })?;
            let token =
                bearer_token(&req).ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

            let profile = auth.authenticate(&token).await.map_err(|e| match e {
                // A validly signed token for a user that no longer exists.
                AuthError::UserNotFound => AppError::Unauthorized("Invalid token".into()),
                other => AppError::from(other),
            })?;

            req.extensions_mut().insert(profile);
            service.call(req).await
        })
    }
}
