pub mod auth;
pub mod task;

pub use auth::{LoginRequest, LoginResponse};
pub use task::{ListQuery, TaskRequest, TaskResponse};
