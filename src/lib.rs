#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Domain models, persistence contracts, the auth and task services, HTTP routes"]
#![doc = "and error handling for the taskboard API. The binary (`main.rs`) wires them"]
#![doc = "to Postgres and runs the server; the integration tests wire them to the"]
#![doc = "in-memory repositories."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use error::AppError;
pub use services::{AuthService, TaskService};
