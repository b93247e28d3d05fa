// handlers/protected/tasks.rs - /api/v1/task/task/*

use axum::extract::State;
use uuid::Uuid;

use crate::api::{ApiPath, ApiQuery, PageQuery, ValidatedJson};
use crate::app::AppState;
use crate::database::models::{NewTask, TaskPatch};
use crate::middleware::{ApiResponse, ApiResult, AuthContext};

pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<NewTask>,
) -> ApiResult {
    let task = state.tasks.create(&auth, body).await?;
    Ok(ApiResponse::created("Task created successfully").with("task", task))
}

pub async fn list_get(State(state): State<AppState>, auth: AuthContext, ApiQuery(query): ApiQuery<PageQuery>) -> ApiResult {
    let request = query.resolve(&state.config.api)?;
    let page = state.tasks.list(&auth, request).await?;
    Ok(ApiResponse::paginated("Tasks retrieved successfully", page))
}

pub async fn get(State(state): State<AppState>, auth: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let task = state.tasks.get(&auth, id).await?;
    Ok(ApiResponse::ok("Task retrieved successfully").with("task", task))
}

pub async fn update_put(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(body): ValidatedJson<TaskPatch>,
) -> ApiResult {
    let task = state.tasks.update(&auth, id, body).await?;
    Ok(ApiResponse::ok("Task updated successfully").with("task", task))
}

pub async fn delete(State(state): State<AppState>, auth: AuthContext, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    state.tasks.delete(&auth, id).await?;
    Ok(ApiResponse::ok("Task deleted successfully"))
}
