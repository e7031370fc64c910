use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::manager::DatabaseError;
use crate::database::models::{Task, TaskFields};
use crate::database::repository::TaskRepository;

const COLUMNS: &str = "id, title, description, completed, priority, created_at";

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                completed BOOLEAN NOT NULL DEFAULT 0,
                priority INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks (completed)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert(&self, fields: &TaskFields) -> Result<Task, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, completed, priority, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.completed)
        .bind(fields.priority)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(task)
    }

    async fn find_all(&self) -> Result<Vec<Task>, DatabaseError> {
        let tasks = sqlx::query_as::<_, Task>(&format!("SELECT {COLUMNS} FROM tasks ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Task>, DatabaseError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE completed = ? ORDER BY id"
        ))
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let task = sqlx::query_as::<_, Task>(&format!("SELECT {COLUMNS} FROM tasks WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update(&self, id: i64, fields: &TaskFields) -> Result<Option<Task>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            return Ok(None);
        }

        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = ?, description = ?, completed = ?, priority = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.completed)
        .bind(fields.priority)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(task))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn repository() -> SqliteTaskRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let repository = SqliteTaskRepository::new(pool);
        repository.migrate().await.unwrap();
        repository
    }

    fn fields(title: &str, completed: bool) -> TaskFields {
        TaskFields {
            title: title.to_string(),
            description: None,
            completed,
            priority: 0,
        }
    }

    #[tokio::test]
    async fn find_by_completed_returns_matches() {
        let repo = repository().await;
        repo.insert(&fields("Done", true)).await.unwrap();
        repo.insert(&fields("Todo", false)).await.unwrap();

        let done = repo.find_by_completed(true).await.unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].title, "Done");

        let todo = repo.find_by_completed(false).await.unwrap();
        assert_eq!(todo.len(), 1);
        assert_eq!(todo[0].title, "Todo");
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_timestamp() {
        let repo = repository().await;
        let first = repo.insert(&fields("First", false)).await.unwrap();
        let second = repo.insert(&fields("Second", false)).await.unwrap();

        assert!(second.id > first.id);
        assert!(first.created_at <= second.created_at);
        assert_eq!(repo.find_by_id(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn update_keeps_identity_and_creation_time() {
        let repo = repository().await;
        let created = repo.insert(&fields("Draft", false)).await.unwrap();

        let changes = TaskFields {
            title: "Final".to_string(),
            description: Some("edited".to_string()),
            completed: true,
            priority: 5,
        };
        let updated = repo.update(created.id, &changes).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.description.as_deref(), Some("edited"));
        assert!(updated.completed);
        assert_eq!(updated.priority, 5);
    }

    #[tokio::test]
    async fn update_missing_row_returns_none() {
        let repo = repository().await;
        assert_eq!(repo.update(42, &fields("x", false)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let repo = repository().await;
        let task = repo.insert(&fields("Doomed", false)).await.unwrap();

        assert!(repo.delete(task.id).await.unwrap());
        assert!(!repo.delete(task.id).await.unwrap());
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
