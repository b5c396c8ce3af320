// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Task endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use super::{storage_failure, ApiJson, References};
use crate::{
    audit_log,
    auth::Auth,
    error::ApiError,
    models::{CreateTaskRequest, MessageResponse, TaskListResponse, TaskResponse},
    state::AppState,
    storage::{
        repository::{paginate, TaskPriority, TaskStatus},
        AuditEventType, OwnershipCheck, OwnershipFilter, StoredTask, TaskQuery, TaskRepository,
        TaskStats, TaskUpdate,
    },
};

/// Query parameters for listing tasks.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksParams {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    security(("bearer" = [])),
    params(ListTasksParams),
    responses(
        (status = 200, description = "Tasks by due date, then priority", body = TaskListResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn list_tasks(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(params): Query<ListTasksParams>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let query = OwnershipFilter::scope_query(
        &user,
        TaskQuery {
            status: params.status,
            priority: params.priority,
            created_by: None,
        },
    );

    let storage = state.storage();
    let tasks = TaskRepository::new(&storage)
        .list(&query)
        .map_err(|e| state.server_error("Failed to list tasks", e))?;

    let page = paginate(tasks, params.page, params.limit);
    let pagination = (&page).into();
    let tasks = References::new(&user, &storage)
        .task_views(page.items)
        .map_err(|e| state.server_error("Failed to resolve task references", e))?;
    Ok(Json(TaskListResponse { tasks, pagination }))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    security(("bearer" = [])),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Missing title or due date, or unparseable due date"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn create_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = request.into_task(&user.user_id)?;

    let storage = state.storage();
    TaskRepository::new(&storage)
        .create(&task)
        .map_err(|e| state.server_error("Failed to create task", e))?;

    audit_log!(&storage, AuditEventType::TaskCreated, user, "task", &task.id);

    let task = References::new(&user, &storage)
        .task_view(task)
        .map_err(|e| state.server_error("Failed to resolve task references", e))?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: Some("Task created successfully".to_string()),
            task,
        }),
    ))
}

/// Counts by status and priority, plus open tasks past their due date.
#[utoipa::path(
    get,
    path = "/api/tasks/stats",
    tag = "Tasks",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Counts over the tasks visible to the caller", body = TaskStats),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn task_stats(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<TaskStats>, ApiError> {
    let query = OwnershipFilter::scope_query(&user, TaskQuery::default());
    let storage = state.storage();
    let stats = TaskRepository::new(&storage)
        .stats(&query)
        .map_err(|e| state.server_error("Failed to compute task stats", e))?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("task_id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task", body = TaskResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn get_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let storage = state.storage();
    let task = TaskRepository::new(&storage)
        .get(&task_id)
        .visible_to(&user)
        .map_err(|e| storage_failure::<StoredTask>(&state, "Failed to load task", e))?;

    let task = References::new(&user, &storage)
        .task_view(task)
        .map_err(|e| state.server_error("Failed to resolve task references", e))?;
    Ok(Json(TaskResponse { message: None, task }))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("task_id" = String, Path, description = "Task ID")),
    request_body = TaskUpdate,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Blank title or unparseable due date"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn update_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    ApiJson(update): ApiJson<TaskUpdate>,
) -> Result<Json<TaskResponse>, ApiError> {
    update.validate()?;
    let storage = state.storage();
    let repo = TaskRepository::new(&storage);
    let mut task = repo
        .get(&task_id)
        .visible_to(&user)
        .map_err(|e| storage_failure::<StoredTask>(&state, "Failed to load task", e))?;

    task.apply(update)
        .map_err(|_| ApiError::bad_request("Invalid due date"))?;
    repo.update(&task)
        .map_err(|e| storage_failure::<StoredTask>(&state, "Failed to update task", e))?;

    audit_log!(&storage, AuditEventType::TaskUpdated, user, "task", &task.id);

    let task = References::new(&user, &storage)
        .task_view(task)
        .map_err(|e| state.server_error("Failed to resolve task references", e))?;
    Ok(Json(TaskResponse {
        message: Some("Task updated successfully".to_string()),
        task,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("task_id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn delete_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let storage = state.storage();
    let repo = TaskRepository::new(&storage);
    let task = repo
        .get(&task_id)
        .visible_to(&user)
        .map_err(|e| storage_failure::<StoredTask>(&state, "Failed to load task", e))?;

    repo.delete(&task.id)
        .map_err(|e| storage_failure::<StoredTask>(&state, "Failed to delete task", e))?;

    tracing::info!(task_id = %task.id, user_id = %user.user_id, "Task deleted");
    audit_log!(&storage, AuditEventType::TaskDeleted, user, "task", &task.id);

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}
