/// Project model and database operations
///
/// A project has exactly one owner, set at creation and never null. The
/// member set lives in the `project_members` relation (see
/// [`crate::models::project_member`]). Only the owner may mutate or delete
/// the project; owner-or-member access gates task mutations.
///
/// Deleting a project cascade-deletes its tasks and memberships.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('planned', 'active', 'completed', 'on_hold');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     start_date TIMESTAMPTZ NOT NULL,
///     due_date TIMESTAMPTZ,
///     status project_status NOT NULL DEFAULT 'planned',
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project lifecycle status
///
/// A closed enumeration; unlike task status it carries no derivation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Not started yet
    Planned,

    /// Work in progress
    Active,

    /// Finished
    Completed,

    /// Paused
    OnHold,
}

impl ProjectStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// When work starts
    pub start_date: DateTime<Utc>,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Current status
    pub status: ProjectStatus,

    /// Owner (never null; set at creation)
    pub owner_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// When work starts
    pub start_date: DateTime<Utc>,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Initial status (defaults to Planned)
    pub status: Option<ProjectStatus>,

    /// Owner (the creating user)
    pub owner_id: Uuid,
}

/// Input for updating a project
///
/// Name, description and dates are replaced unconditionally; status is
/// replaced only when supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: String,

    /// New description
    pub description: Option<String>,

    /// New start date
    pub start_date: DateTime<Utc>,

    /// New deadline
    pub due_date: Option<DateTime<Utc>>,

    /// New status (None = no change)
    pub status: Option<ProjectStatus>,
}

/// Task counts for a project read view
///
/// Computed fresh on every read; there are no cached counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaskCounts {
    /// Number of tasks in the project
    pub total: i64,

    /// Number of tasks with status done
    pub completed: i64,
}

impl Project {
    /// Creates a new project owned by the given user
    ///
    /// Accepts a pool or an open transaction; callers that also write the
    /// member set pass the transaction so both land atomically.
    pub async fn create<'e, E>(executor: E, data: CreateProject) -> Result<Self, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, start_date, due_date, status, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, start_date, due_date, status, owner_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.start_date)
        .bind(data.due_date)
        .bind(data.status.unwrap_or(ProjectStatus::Planned))
        .bind(data.owner_id)
        .fetch_one(executor)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, due_date, status, owner_id,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, due_date, status, owner_id,
                   created_at, updated_at
            FROM projects
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists projects where the user is owner or member
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT DISTINCT p.id, p.name, p.description, p.start_date, p.due_date,
                   p.status, p.owner_id, p.created_at, p.updated_at
            FROM projects p
            LEFT JOIN project_members pm ON pm.project_id = p.id
            WHERE p.owner_id = $1 OR pm.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project's mutable fields
    ///
    /// Status is only written when `data.status` is supplied; the stored
    /// value is kept otherwise. Accepts a pool or an open transaction, like
    /// [`Project::create`].
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2,
                description = $3,
                start_date = $4,
                due_date = $5,
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, start_date, due_date, status, owner_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.start_date)
        .bind(data.due_date)
        .bind(data.status)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }

    /// Deletes a project
    ///
    /// Tasks and memberships belonging to the project are removed by the
    /// schema's ON DELETE CASCADE.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the project's tasks, total and completed
    ///
    /// Recomputed per read: O(tasks in project), no incremental maintenance.
    pub async fn task_counts(pool: &PgPool, id: Uuid) -> Result<TaskCounts, sqlx::Error> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'done')
            FROM tasks
            WHERE project_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(TaskCounts { total, completed })
    }

    /// Checks whether the given user is the project's owner
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_as_str() {
        assert_eq!(ProjectStatus::Planned.as_str(), "planned");
        assert_eq!(ProjectStatus::Active.as_str(), "active");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
        assert_eq!(ProjectStatus::OnHold.as_str(), "on_hold");
    }

    #[test]
    fn test_project_status_serde_round_trip() {
        let json = serde_json::to_string(&ProjectStatus::OnHold).unwrap();
        assert_eq!(json, "\"on_hold\"");

        let status: ProjectStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, ProjectStatus::Active);
    }

    #[test]
    fn test_is_owned_by() {
        let owner = Uuid::new_v4();
        let project = Project {
            id: Uuid::new_v4(),
            name: "Website".to_string(),
            description: None,
            start_date: Utc::now(),
            due_date: None,
            status: ProjectStatus::Planned,
            owner_id: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(project.is_owned_by(owner));
        assert!(!project.is_owned_by(Uuid::new_v4()));
    }
}
