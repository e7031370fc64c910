pub mod task;

pub use task::{Task, TaskFields};
