/// Project CRUD and membership endpoints
///
/// All endpoints require JWT authentication. Creation is open to any
/// authenticated user; mutations and membership changes are owner-only.
/// Reads are not membership-gated.
///
/// # Endpoints
///
/// - `GET    /v1/projects` - List all projects
/// - `GET    /v1/projects/user` - Projects the caller owns or belongs to
/// - `GET    /v1/projects/:id` - Get project by id
/// - `POST   /v1/projects` - Create project (caller becomes owner)
/// - `PUT    /v1/projects/:id` - Update project (owner only)
/// - `DELETE /v1/projects/:id` - Delete project and its tasks (owner only)
/// - `POST   /v1/projects/:id/members/:user_id` - Add member (owner only)
/// - `DELETE /v1/projects/:id/members/:user_id` - Remove member (owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        project::{CreateProject, Project, ProjectStatus, UpdateProject},
        project_member::ProjectMember,
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// When work starts
    pub start_date: DateTime<Utc>,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Initial status (defaults to planned)
    pub status: Option<ProjectStatus>,

    /// Initial member set (each id must resolve to a user)
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

/// Update project request
///
/// Name, description and dates are replaced unconditionally; status only
/// when supplied; the member set only when `member_ids` is present (absent
/// means unchanged, an empty list clears it).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// New description
    pub description: Option<String>,

    /// New start date
    pub start_date: DateTime<Utc>,

    /// New deadline
    pub due_date: Option<DateTime<Utc>>,

    /// New status (None = no change)
    pub status: Option<ProjectStatus>,

    /// Replacement member set (None = no change)
    pub member_ids: Option<Vec<Uuid>>,
}

/// Project read view
///
/// Task counts and the member list are computed fresh on every read.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    /// The project row
    #[serde(flatten)]
    pub project: Project,

    /// Member users (excluding the owner unless also a member)
    pub members: Vec<User>,

    /// Number of tasks in the project
    pub total_tasks: i64,

    /// Number of tasks with status done
    pub completed_tasks: i64,
}

async fn project_response(state: &AppState, project: Project) -> ApiResult<ProjectResponse> {
    let counts = Project::task_counts(&state.db, project.id).await?;
    let members = ProjectMember::list_users(&state.db, project.id).await?;

    Ok(ProjectResponse {
        project,
        members,
        total_tasks: counts.total,
        completed_tasks: counts.completed,
    })
}

/// Resolves every id to an existing user before any membership write
async fn resolve_members(state: &AppState, user_ids: &[Uuid]) -> ApiResult<()> {
    for user_id in user_ids {
        if !User::exists(&state.db, *user_id).await? {
            return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
        }
    }

    Ok(())
}

async fn load_project(state: &AppState, id: Uuid) -> ApiResult<Project> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project not found: {}", id)))
}

/// List all projects
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = Project::list_all(&state.db).await?;

    let mut responses = Vec::with_capacity(projects.len());
    for project in projects {
        responses.push(project_response(&state, project).await?);
    }

    Ok(Json(responses))
}

/// List projects the caller owns or is a member of
pub async fn list_my_projects(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = Project::list_for_user(&state.db, auth.user_id).await?;

    let mut responses = Vec::with_capacity(projects.len());
    for project in projects {
        responses.push(project_response(&state, project).await?);
    }

    Ok(Json(responses))
}

/// Get a project by id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = load_project(&state, id).await?;
    Ok(Json(project_response(&state, project).await?))
}

/// Create a project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    resolve_members(&state, &req.member_ids).await?;

    // Project and member rows commit together or not at all
    let mut tx = state.db.begin().await?;

    let project = Project::create(
        &mut *tx,
        CreateProject {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            due_date: req.due_date,
            status: req.status,
            owner_id: auth.user_id,
        },
    )
    .await?;

    for user_id in &req.member_ids {
        ProjectMember::add(&mut *tx, project.id, *user_id).await?;
    }

    tx.commit().await?;

    tracing::info!(project_id = %project.id, owner_id = %auth.user_id, "Project created");

    Ok(Json(project_response(&state, project).await?))
}

/// Update a project (owner only)
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = load_project(&state, id).await?;
    authorization::require_project_owner(&project, auth.user_id)?;

    if let Some(member_ids) = &req.member_ids {
        resolve_members(&state, member_ids).await?;
    }

    // One transaction across the member-set swap and the field update; a
    // failure in either rolls back both
    let mut tx = state.db.begin().await?;

    if let Some(member_ids) = &req.member_ids {
        ProjectMember::replace_all(&mut *tx, project.id, member_ids).await?;
    }

    let updated = Project::update(
        &mut *tx,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            due_date: req.due_date,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Project not found: {}", id)))?;

    tx.commit().await?;

    Ok(Json(project_response(&state, updated).await?))
}

/// Delete a project (owner only)
///
/// Tasks and memberships belonging to the project are removed with it.
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project = load_project(&state, id).await?;
    authorization::require_project_owner(&project, auth.user_id)?;

    Project::delete(&state.db, id).await?;

    tracing::info!(project_id = %id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to the project's member set (owner only)
///
/// Idempotent: adding an existing member succeeds without change.
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let project = load_project(&state, id).await?;
    authorization::require_project_owner(&project, auth.user_id)?;

    if !User::exists(&state.db, user_id).await? {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }

    ProjectMember::add(&state.db, id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a user from the project's member set (owner only)
///
/// Removing a non-member is a no-op success.
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let project = load_project(&state, id).await?;
    authorization::require_project_owner(&project, auth.user_id)?;

    if !User::exists(&state.db, user_id).await? {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }

    ProjectMember::remove(&state.db, id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_member_ids_default_empty() {
        let req: CreateProjectRequest = serde_json::from_str(
            r#"{"name": "Website", "start_date": "2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(req.member_ids.is_empty());
        assert!(req.status.is_none());
    }

    #[test]
    fn test_update_request_absent_members_means_unchanged() {
        let req: UpdateProjectRequest = serde_json::from_str(
            r#"{"name": "Website", "start_date": "2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(req.member_ids.is_none());

        let req: UpdateProjectRequest = serde_json::from_str(
            r#"{"name": "Website", "start_date": "2026-01-01T00:00:00Z", "member_ids": []}"#,
        )
        .unwrap();
        assert_eq!(req.member_ids, Some(vec![]));
    }
}
