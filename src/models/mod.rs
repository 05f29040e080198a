pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPriority, TaskQuery, TaskUpdate};
pub use user::{NewUser, PublicUser, UserProfile, UserRecord};
