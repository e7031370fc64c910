use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Task, TaskFields};

/// Persistence operations on the `tasks` table.
///
/// Every mutating call runs in its own transaction: either the whole change
/// is committed or nothing is.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Creates the schema if it does not exist yet.
    async fn migrate(&self) -> Result<(), DatabaseError>;

    async fn insert(&self, fields: &TaskFields) -> Result<Task, DatabaseError>;

    /// All tasks ordered by id.
    async fn find_all(&self) -> Result<Vec<Task>, DatabaseError>;

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Task>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, DatabaseError>;

    /// Overwrites the writable columns. `Ok(None)` when no row has this id.
    async fn update(&self, id: i64, fields: &TaskFields) -> Result<Option<Task>, DatabaseError>;

    /// `Ok(false)` when no row has this id.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn close(&self);
}
