use crate::{
    auth::{AuthenticatedUser, LoginRequest, RefreshRequest, RegisterRequest, TokenResponse},
    error::AppError,
    services::AuthService,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates the account and returns `201 Created` with `{token, user}`.
/// A taken email yields `409 Conflict`.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let response = auth
        .register_user(
            &register_data.email,
            &register_data.password,
            &register_data.name,
        )
        .await?;

    Ok(HttpResponse::Created().json(response))
}

/// Login user
///
/// Returns `{token, user}`. Unknown emails and wrong passwords both answer
/// `401 Unauthorized` with the same body.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let response = auth
        .login_user(&login_data.email, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Exchange a still-valid token for a fresh one.
#[post("/refresh")]
pub async fn refresh(
    auth: web::Data<AuthService>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    refresh_data.validate()?;

    let token = auth.refresh_token(&refresh_data.token)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// The authenticated caller's profile.
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(user.0)
}
