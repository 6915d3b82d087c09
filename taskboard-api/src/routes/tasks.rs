/// Task CRUD and lifecycle endpoints
///
/// All endpoints require JWT authentication. Every mutation checks the
/// caller against the task's *current* project: owner or member, otherwise
/// 403. Reads are not membership-gated.
///
/// Status and progress are coupled: a progress write derives the status
/// (0 = todo, 100 = done, mid-range bumps todo/done to in_progress), and a
/// status write to done forces progress to 100. Other status writes leave
/// progress alone, so done-at-40% is reachable and stays until the next
/// progress write.
///
/// # Endpoints
///
/// - `GET    /v1/tasks` - List all tasks
/// - `GET    /v1/tasks/assigned` - Tasks assigned to the caller
/// - `GET    /v1/tasks/project/:project_id` - Tasks of a project
/// - `GET    /v1/tasks/:id` - Get task by id
/// - `POST   /v1/tasks` - Create task
/// - `PUT    /v1/tasks/:id` - Full-field update
/// - `DELETE /v1/tasks/:id` - Delete task
/// - `PATCH  /v1/tasks/:id/status?status=…` - Set status
/// - `PATCH  /v1/tasks/:id/progress?progress=…` - Set progress
/// - `PATCH  /v1/tasks/:id/assign/:user_id` - Assign to user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        project::Project,
        task::{
            progress_after_status, valid_priority, valid_progress, CreateTask, Task, TaskStatus,
            UpdateTask,
        },
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (defaults to todo)
    pub status: Option<TaskStatus>,

    /// Priority, 1-5
    pub priority: i32,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Owning project
    pub project_id: Uuid,

    /// Assigned user, if any
    pub assignee_id: Option<Uuid>,

    /// Initial progress (defaults to 0)
    pub progress: Option<i32>,
}

/// Full-field update request
///
/// Status and progress are written only when supplied, as raw values with
/// no derivation. An absent assignee clears the assignment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// New description
    pub description: Option<String>,

    /// New status (None = no change)
    pub status: Option<TaskStatus>,

    /// New priority, 1-5
    pub priority: i32,

    /// New deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Owning project (may move the task)
    pub project_id: Uuid,

    /// New assignee (None = unassign)
    pub assignee_id: Option<Uuid>,

    /// New progress (None = no change)
    pub progress: Option<i32>,
}

/// Status update query parameters
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    /// Target status, parsed case-insensitively
    pub status: String,
}

/// Progress update query parameters
#[derive(Debug, Deserialize)]
pub struct ProgressParams {
    /// Target progress percentage, 0-100
    pub progress: i32,
}

/// Task read view
///
/// `is_overdue` is evaluated against "now" at response construction, so it
/// can flip between two reads without any write.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// The task row
    #[serde(flatten)]
    pub task: Task,

    /// Whether the due date has passed while the task is not done
    pub is_overdue: bool,
}

impl TaskResponse {
    fn new(task: Task) -> Self {
        let is_overdue = task.is_overdue(Utc::now());
        Self { task, is_overdue }
    }
}

async fn load_task(state: &AppState, id: Uuid) -> ApiResult<Task> {
    Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))
}

async fn load_project(state: &AppState, id: Uuid) -> ApiResult<Project> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project not found: {}", id)))
}

/// Loads the task's current project and checks owner-or-member access
async fn require_task_access(state: &AppState, task: &Task, caller: Uuid) -> ApiResult<()> {
    let project = load_project(state, task.project_id).await?;
    authorization::require_project_access(&state.db, &project, caller).await?;
    Ok(())
}

async fn require_assignee_exists(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    if !User::exists(&state.db, user_id).await? {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }
    Ok(())
}

/// List all tasks
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list_all(&state.db).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::new).collect()))
}

/// List tasks assigned to the caller
pub async fn list_assigned_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list_by_assignee(&state.db, auth.user_id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::new).collect()))
}

/// List tasks belonging to a project
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    load_project(&state, project_id).await?;

    let tasks = Task::list_by_project(&state.db, project_id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::new).collect()))
}

/// Get a task by id
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = load_task(&state, id).await?;
    Ok(Json(TaskResponse::new(task)))
}

/// Create a task in a project the caller can access
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = load_project(&state, req.project_id).await?;
    authorization::require_project_access(&state.db, &project, auth.user_id).await?;

    if !valid_priority(req.priority) {
        return Err(ApiError::BadRequest(
            "Priority must be between 1 and 5".to_string(),
        ));
    }

    if let Some(progress) = req.progress {
        if !valid_progress(progress) {
            return Err(ApiError::BadRequest(
                "Progress must be between 0 and 100".to_string(),
            ));
        }
    }

    if let Some(assignee_id) = req.assignee_id {
        require_assignee_exists(&state, assignee_id).await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            project_id: req.project_id,
            assignee_id: req.assignee_id,
            progress: req.progress,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, project_id = %task.project_id, "Task created");

    Ok(Json(TaskResponse::new(task)))
}

/// Full-field task update
///
/// Access is checked against the task's current project. A project move
/// only requires the destination to exist; membership of the destination is
/// not re-checked.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let task = load_task(&state, id).await?;
    require_task_access(&state, &task, auth.user_id).await?;

    if !valid_priority(req.priority) {
        return Err(ApiError::BadRequest(
            "Priority must be between 1 and 5".to_string(),
        ));
    }

    if let Some(progress) = req.progress {
        if !valid_progress(progress) {
            return Err(ApiError::BadRequest(
                "Progress must be between 0 and 100".to_string(),
            ));
        }
    }

    if req.project_id != task.project_id {
        load_project(&state, req.project_id).await?;
    }

    if let Some(assignee_id) = req.assignee_id {
        require_assignee_exists(&state, assignee_id).await?;
    }

    let updated = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            project_id: req.project_id,
            assignee_id: req.assignee_id,
            progress: req.progress,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))?;

    Ok(Json(TaskResponse::new(updated)))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let task = load_task(&state, id).await?;
    require_task_access(&state, &task, auth.user_id).await?;

    Task::delete(&state.db, id).await?;

    tracing::info!(task_id = %id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Set a task's status
///
/// Setting done forces progress to 100; any other status leaves the stored
/// progress untouched, which can leave a status/progress pair inconsistent
/// until the next progress write.
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Query(params): Query<StatusParams>,
) -> ApiResult<Json<TaskResponse>> {
    let task = load_task(&state, id).await?;
    require_task_access(&state, &task, auth.user_id).await?;

    let status = TaskStatus::parse(&params.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", params.status)))?;

    let progress = progress_after_status(status, task.progress);

    let updated = Task::set_status(&state.db, id, status, progress)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))?;

    Ok(Json(TaskResponse::new(updated)))
}

/// Set a task's progress
///
/// The range check runs before the existence and access checks; an
/// out-of-range value is rejected even for a missing or foreign task. The
/// new status is derived from the progress on every write.
pub async fn update_task_progress(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Query(params): Query<ProgressParams>,
) -> ApiResult<Json<TaskResponse>> {
    if !valid_progress(params.progress) {
        return Err(ApiError::BadRequest(
            "Progress must be between 0 and 100".to_string(),
        ));
    }

    let task = load_task(&state, id).await?;
    require_task_access(&state, &task, auth.user_id).await?;

    let status = TaskStatus::after_progress(params.progress, task.status);

    let updated = Task::set_progress(&state.db, id, params.progress, status)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))?;

    Ok(Json(TaskResponse::new(updated)))
}

/// Assign a task to a user
pub async fn assign_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<TaskResponse>> {
    let task = load_task(&state, id).await?;
    require_task_access(&state, &task, auth.user_id).await?;

    require_assignee_exists(&state, user_id).await?;

    let updated = Task::set_assignee(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))?;

    Ok(Json(TaskResponse::new(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{
                "title": "Write docs",
                "priority": 3,
                "project_id": "7f0a9d7e-0b8e-4f2a-93a4-2f1f5b9f6c11"
            }"#,
        )
        .unwrap();

        assert!(req.status.is_none());
        assert!(req.progress.is_none());
        assert!(req.assignee_id.is_none());
    }

    #[test]
    fn test_update_request_absent_assignee_clears() {
        let req: UpdateTaskRequest = serde_json::from_str(
            r#"{
                "title": "Write docs",
                "priority": 3,
                "project_id": "7f0a9d7e-0b8e-4f2a-93a4-2f1f5b9f6c11"
            }"#,
        )
        .unwrap();

        // No assignee in the payload means unassign, not "keep"
        assert!(req.assignee_id.is_none());
        assert!(req.status.is_none());
    }

    #[test]
    fn test_response_overdue_at_construction() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "Write docs".to_string(),
            description: None,
            status: TaskStatus::InProgress,
            priority: 3,
            due_date: Some(Utc::now() - chrono::Duration::hours(1)),
            project_id: Uuid::new_v4(),
            assignee_id: None,
            progress: 50,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(TaskResponse::new(task).is_overdue);
    }
}
