use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use tessera_application::{NewTask, TaskUpdate};
use tessera_core::CallerIdentity;
use tessera_domain::{TaskId, TaskStatus};

use crate::dto::{CreateTaskRequest, TaskListQuery, TaskResponse, UpdateTaskRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = match query.status.as_deref() {
        Some(status) => {
            let status = status.parse::<TaskStatus>()?;
            state.task_service.list_by_status(&caller, status).await?
        }
        None => state.task_service.list(&caller).await?,
    };

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub async fn create_task_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = state
        .task_service
        .add(&caller, NewTask::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

pub async fn get_task_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id = TaskId::new(task_id)?;
    let task = state.task_service.get(&caller, &task_id).await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn update_task_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(task_id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id = TaskId::new(task_id)?;
    let task = state
        .task_service
        .update(&caller, &task_id, TaskUpdate::try_from(payload)?)
        .await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    let task_id = TaskId::new(task_id)?;
    state.task_service.remove(&caller, &task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
