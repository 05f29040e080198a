use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskboard::auth::{AuthMiddleware, CredentialHasher, TokenIssuer};
use taskboard::config::Config;
use taskboard::repository::{PgTaskRepository, PgUserRepository};
use taskboard::routes::{self, health};
use taskboard::{AuthService, TaskService};

fn startup_error(context: &str, error: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, error))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;

    let token_ttl = chrono::Duration::try_hours(config.jwt_expiration_hours).ok_or_else(|| {
        startup_error(
            "invalid token lifetime",
            format!("{} hours", config.jwt_expiration_hours),
        )
    })?;
    let auth = web::Data::new(AuthService::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        CredentialHasher::new(config.bcrypt_cost),
        TokenIssuer::new(config.jwt_secret.as_bytes(), token_ttl),
    ));
    let tasks = web::Data::new(TaskService::new(Arc::new(PgTaskRepository::new(pool))));

    log::info!("Starting taskboard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(auth.clone())
            .app_data(tasks.clone())
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
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
