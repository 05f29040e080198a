pub mod auth;
pub mod tasks;

pub use auth::{AuthError, AuthResponse, AuthService};
pub use tasks::{TaskError, TaskService};
