use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::api::{TaskRequest, TaskResponse};
use crate::auth::AuthUser;
use crate::database::{DatabaseError, TaskRepository};
use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(i64),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<FieldErrors> for TaskError {
    fn from(fields: FieldErrors) -> Self {
        TaskError::Validation(fields)
    }
}

/// Validates task requests, applies them to the store and shapes responses.
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<dyn TaskRepository> {
        &self.repository
    }

    pub async fn create(&self, user: &AuthUser, request: TaskRequest) -> Result<TaskResponse, TaskError> {
        let fields = request.validate()?;
        let task = self.repository.insert(&fields).await?;

        info!(user = %user.username, task_id = task.id, "Created task");
        Ok(task.into())
    }

    pub async fn list(&self, _user: &AuthUser, completed: Option<bool>) -> Result<Vec<TaskResponse>, TaskError> {
        let tasks = match completed {
            Some(completed) => self.repository.find_by_completed(completed).await?,
            None => self.repository.find_all().await?,
        };
        Ok(tasks.into_iter().map(TaskResponse::from).collect())
    }

    pub async fn get(&self, _user: &AuthUser, id: i64) -> Result<TaskResponse, TaskError> {
        self.repository
            .find_by_id(id)
            .await?
            .map(TaskResponse::from)
            .ok_or(TaskError::NotFound(id))
    }

    pub async fn update(&self, user: &AuthUser, id: i64, request: TaskRequest) -> Result<TaskResponse, TaskError> {
        let fields = request.validate()?;
        let task = self
            .repository
            .update(id, &fields)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        info!(user = %user.username, task_id = id, "Updated task");
        Ok(task.into())
    }

    pub async fn delete(&self, user: &AuthUser, id: i64) -> Result<(), TaskError> {
        if !self.repository.delete(id).await? {
            return Err(TaskError::NotFound(id));
        }

        info!(user = %user.username, task_id = id, "Deleted task");
        Ok(())
    }
}
