use axum::extract::{rejection::PathRejection, Path, State};

use crate::api::{TaskRequest, TaskResponse};
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};

fn task_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

/// GET /api/tasks/:id - show a single task
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<TaskResponse> {
    let id = task_id(path)?;
    let task = state.tasks.get(&user, id).await?;
    Ok(ApiResponse::success(task))
}

/// PUT /api/tasks/:id - replace title, description, completed and priority
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    JsonBody(request): JsonBody<TaskRequest>,
) -> ApiResult<TaskResponse> {
    let id = task_id(path)?;
    let task = state.tasks.update(&user, id, request).await?;
    Ok(ApiResponse::success(task))
}

/// DELETE /api/tasks/:id - remove a task
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = task_id(path)?;
    state.tasks.delete(&user, id).await?;
    Ok(ApiResponse::no_content())
}
