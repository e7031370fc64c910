use axum::extract::{rejection::QueryRejection, Query, State};

use crate::api::{ListQuery, TaskRequest, TaskResponse};
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};

/// GET /api/tasks?completed={bool} - list tasks, optionally filtered by completion
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<TaskResponse>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let tasks = state.tasks.list(&user, query.completed).await?;
    Ok(ApiResponse::success(tasks))
}

/// POST /api/tasks - create a task
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(request): JsonBody<TaskRequest>,
) -> ApiResult<TaskResponse> {
    let task = state.tasks.create(&user, request).await?;
    Ok(ApiResponse::created(task))
}
