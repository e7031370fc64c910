pub mod collection;
pub mod record;

// Re-export handler functions for use in routing
pub use collection::get as tasks_get;
pub use collection::post as tasks_post;

pub use record::delete as task_delete;
pub use record::get as task_get;
pub use record::put as task_put;
