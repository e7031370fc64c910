pub mod manager;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod sqlite;

pub use manager::{connect, Backend, DatabaseError};
pub use models::{Task, TaskFields};
pub use repository::TaskRepository;
