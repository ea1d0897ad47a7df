/// Task endpoints
///
/// Regular users only see and modify their own tasks; admins see and
/// modify every task. Single-task handlers check in a fixed order:
/// the task must exist (404), then the caller must own it or be an admin
/// (403), and only then is anything written.
///
/// # Endpoints
///
/// - `POST /tasks/` - Create a task owned by the caller
/// - `GET /tasks/` - List tasks
/// - `GET /tasks/:id` - Read one task
/// - `PUT /tasks/:id` - Overwrite title, description and status
/// - `DELETE /tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Pagination, ValidatedJson},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::AnyPool;
use taskdesk_shared::{
    auth::{
        authorization::{require_task_access, TaskAction},
        middleware::AuthContext,
    },
    models::task::{CreateTask, Task, TaskStatus, UpdateTask},
};
use tracing::{debug, info, warn};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,
}

/// Update task request
///
/// Omitting `status` resets it to `pending`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,
}

/// Loads a task and checks the caller may perform `action` on it
async fn load_authorized(
    pool: &AnyPool,
    auth: &AuthContext,
    task_id: i64,
    action: TaskAction,
) -> ApiResult<Task> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if let Err(e) = require_task_access(auth, &task, action) {
        warn!(
            user_id = auth.user_id,
            task_id,
            owner_id = task.owner_id,
            action = %action,
            "Task access denied"
        );
        return Err(e.into());
    }

    Ok(task)
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /tasks/
/// Authorization: Bearer <token>
///
/// { "title": "Write report", "description": "Quarterly numbers" }
/// ```
///
/// The new task is owned by the caller and starts as `pending`.
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
        },
        auth.user_id,
    )
    .await?;

    info!(task_id = task.id, owner_id = task.owner_id, "Task created");

    Ok(Json(task))
}

/// List tasks
///
/// # Endpoint
///
/// ```text
/// GET /tasks/?skip=0&limit=100
/// Authorization: Bearer <token>
/// ```
///
/// Admins get every task, everyone else only their own.
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    page: Pagination,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = if auth.is_admin() {
        Task::list(&state.db, page.skip, page.limit).await?
    } else {
        Task::list_by_owner(&state.db, auth.user_id, page.skip, page.limit).await?
    };

    debug!(user_id = auth.user_id, count = tasks.len(), "Listed tasks");

    Ok(Json(tasks))
}

/// Read one task
///
/// # Errors
///
/// - `404 Not Found`: Task not found
/// - `403 Forbidden`: Not authorized to access this task
pub async fn read_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = load_authorized(&state.db, &auth, task_id, TaskAction::Access).await?;
    Ok(Json(task))
}

/// Overwrite a task
///
/// Title, description and status are replaced together; a missing
/// description clears it.
///
/// # Errors
///
/// - `404 Not Found`: Task not found
/// - `403 Forbidden`: Not authorized to update this task
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    load_authorized(&state.db, &auth, task_id, TaskAction::Update).await?;

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    info!(task_id, status = %task.status, "Task updated");

    Ok(Json(task))
}

/// Delete a task
///
/// # Errors
///
/// - `404 Not Found`: Task not found
/// - `403 Forbidden`: Not authorized to delete this task
/// - `500 Internal Server Error`: The row was gone by the time of the delete
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<i64>,
) -> ApiResult<StatusCode> {
    load_authorized(&state.db, &auth, task_id, TaskAction::Delete).await?;

    if !Task::delete(&state.db, task_id).await? {
        return Err(ApiError::OperationFailed("Failed to delete task".to_string()));
    }

    info!(task_id, user_id = auth.user_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}
