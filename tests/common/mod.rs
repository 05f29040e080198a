#![allow(dead_code)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::Duration;
use serde_json::json;

use taskboard::auth::{AuthMiddleware, CredentialHasher, TokenIssuer};
use taskboard::repository::{InMemoryTaskRepository, InMemoryUserRepository};
use taskboard::routes::{self, health};
use taskboard::services::AuthResponse;
use taskboard::{AuthService, TaskService};

pub const JWT_SECRET: &[u8] = b"integration-test-secret";

/// Everything one test needs; each test builds its own.
pub struct TestState {
    pub auth: web::Data<AuthService>,
    pub tasks: web::Data<TaskService>,
    pub users: Arc<InMemoryUserRepository>,
}

pub struct TestUser {
    pub id: i32,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(JWT_SECRET, Duration::hours(1))
}

pub fn fresh_state() -> TestState {
    let users = Arc::new(InMemoryUserRepository::new());
    let auth = AuthService::new(users.clone(), CredentialHasher::new(4), token_issuer());
    let tasks = TaskService::new(Arc::new(InMemoryTaskRepository::new()));
    TestState {
        auth: web::Data::new(auth),
        tasks: web::Data::new(tasks),
        users,
    }
}

pub async fn init_app(
    state: &TestState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(state.auth.clone())
            .app_data(state.tasks.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await
}

pub async fn register_user(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    name: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if !status.is_success() {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse registration response: {}", e))?;

    Ok(TestUser {
        id: auth.user.id,
        token: auth.token,
    })
}
