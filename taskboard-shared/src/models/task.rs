/// Task model, database operations, and the status/progress coupling
///
/// Tasks belong to exactly one project and carry a status plus a progress
/// percentage that are updated independently but must stay consistent after
/// each single mutation:
///
/// - Setting status to done forces progress to 100.
/// - Writing progress derives status: 0 ⇒ todo, 100 ⇒ done, anything in
///   between bumps a todo/done task to in_progress and leaves an
///   in_progress task alone.
///
/// The derivation is one-way (progress drives status on progress writes
/// only). A direct status write can produce combinations like done at 40%
/// progress; those persist until the next progress write. That window is
/// intentional behavior, not something the model corrects.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 5),
///     due_date TIMESTAMPTZ,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task status
///
/// Not a strict state machine: any value may be set directly, and no state
/// is terminal. The only structure on top of the free-form field is the
/// derivation applied by progress writes (see [`TaskStatus::after_progress`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Parses a status string, case-insensitively
    ///
    /// Returns `None` for anything outside the enumeration; callers surface
    /// that as an invalid-argument failure.
    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s.to_ascii_lowercase().as_str() {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Derives the status that follows a progress write
    ///
    /// Applied on every progress update, in this priority order:
    /// 1. progress == 0 ⇒ todo
    /// 2. progress == 100 ⇒ done
    /// 3. otherwise, only a current status of todo or done becomes
    ///    in_progress; in_progress stays as it is.
    pub fn after_progress(progress: i32, current: TaskStatus) -> TaskStatus {
        if progress == 0 {
            TaskStatus::Todo
        } else if progress == 100 {
            TaskStatus::Done
        } else if matches!(current, TaskStatus::Todo | TaskStatus::Done) {
            TaskStatus::InProgress
        } else {
            current
        }
    }
}

/// Derives the progress that follows a direct status write
///
/// Marking a task done forces progress to 100; every other status leaves
/// the stored progress untouched.
pub fn progress_after_status(status: TaskStatus, current_progress: i32) -> i32 {
    if status == TaskStatus::Done {
        100
    } else {
        current_progress
    }
}

/// Checks that a priority value is inside the allowed 1–5 range
pub fn valid_priority(priority: i32) -> bool {
    (1..=5).contains(&priority)
}

/// Checks that a progress percentage is inside the allowed 0–100 range
pub fn valid_progress(progress: i32) -> bool {
    (0..=100).contains(&progress)
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Priority, 1 (lowest) to 5 (highest)
    pub priority: i32,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Owning project (never null, reassignable)
    pub project_id: Uuid,

    /// Assigned user, if any
    pub assignee_id: Option<Uuid>,

    /// Completion percentage, 0–100
    pub progress: i32,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (defaults to todo)
    pub status: Option<TaskStatus>,

    /// Priority, 1–5
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

/// Input for a full-field task update
///
/// Title, description, priority and due date are replaced unconditionally;
/// status and progress only when supplied (raw writes, no derivation); an
/// absent assignee clears the assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: String,

    /// New description
    pub description: Option<String>,

    /// New status (None = no change)
    pub status: Option<TaskStatus>,

    /// New priority, 1–5
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

impl Task {
    /// Checks whether the task is overdue at the given instant
    ///
    /// Overdue means a due date exists, lies strictly in the past, and the
    /// task is not done. Evaluated against "now" at read time, so the flag
    /// can flip between two reads without any write.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status != TaskStatus::Done,
            None => false,
        }
    }

    /// Creates a new task
    ///
    /// Status defaults to todo and progress to 0 when unset. Range checks on
    /// priority and progress happen at the API boundary; the schema enforces
    /// them as a backstop.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date,
                               project_id, assignee_id, progress)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, status, priority, due_date,
                      project_id, assignee_id, progress, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.unwrap_or(TaskStatus::Todo))
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.project_id)
        .bind(data.assignee_id)
        .bind(data.progress.unwrap_or(0))
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, due_date,
                   project_id, assignee_id, progress, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, due_date,
                   project_id, assignee_id, progress, created_at, updated_at
            FROM tasks
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks belonging to a project
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, due_date,
                   project_id, assignee_id, progress, created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks assigned to a user
    pub async fn list_by_assignee(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, due_date,
                   project_id, assignee_id, progress, created_at, updated_at
            FROM tasks
            WHERE assignee_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task's fields
    ///
    /// Status and progress are written only when supplied; the other fields
    /// are replaced unconditionally. Callers resolve the target project and
    /// assignee before calling.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                status = COALESCE($4, status),
                priority = $5,
                due_date = $6,
                project_id = $7,
                assignee_id = $8,
                progress = COALESCE($9, progress),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, status, priority, due_date,
                      project_id, assignee_id, progress, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.project_id)
        .bind(data.assignee_id)
        .bind(data.progress)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Writes a status together with its derived progress
    ///
    /// Callers compute the progress via [`progress_after_status`] so the
    /// pair lands in one write.
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: TaskStatus,
        progress: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2,
                progress = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, status, priority, due_date,
                      project_id, assignee_id, progress, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(progress)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Writes a progress value together with its derived status
    ///
    /// Callers compute the status via [`TaskStatus::after_progress`] so the
    /// pair lands in one write.
    pub async fn set_progress(
        pool: &PgPool,
        id: Uuid,
        progress: i32,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        Self::set_status(pool, id, status, progress).await
    }

    /// Overwrites the task's assignee
    pub async fn set_assignee(
        pool: &PgPool,
        id: Uuid,
        assignee_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET assignee_id = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, status, priority, due_date,
                      project_id, assignee_id, progress, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(assignee_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task_with(status: TaskStatus, progress: i32, due_date: Option<DateTime<Utc>>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Write docs".to_string(),
            description: None,
            status,
            priority: 3,
            due_date,
            project_id: Uuid::new_v4(),
            assignee_id: None,
            progress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_task_status_parse_case_insensitive() {
        assert_eq!(TaskStatus::parse("todo"), Some(TaskStatus::Todo));
        assert_eq!(TaskStatus::parse("TODO"), Some(TaskStatus::Todo));
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("IN_PROGRESS"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("done"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse("Done"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse("finished"), None);
        assert_eq!(TaskStatus::parse(""), None);
    }

    #[test]
    fn test_after_progress_zero_resets_to_todo() {
        assert_eq!(TaskStatus::after_progress(0, TaskStatus::Todo), TaskStatus::Todo);
        assert_eq!(TaskStatus::after_progress(0, TaskStatus::InProgress), TaskStatus::Todo);
        assert_eq!(TaskStatus::after_progress(0, TaskStatus::Done), TaskStatus::Todo);
    }

    #[test]
    fn test_after_progress_hundred_completes() {
        assert_eq!(TaskStatus::after_progress(100, TaskStatus::Todo), TaskStatus::Done);
        assert_eq!(TaskStatus::after_progress(100, TaskStatus::InProgress), TaskStatus::Done);
        assert_eq!(TaskStatus::after_progress(100, TaskStatus::Done), TaskStatus::Done);
    }

    #[test]
    fn test_after_progress_midrange() {
        // todo and done bump to in_progress; in_progress stays put
        assert_eq!(TaskStatus::after_progress(50, TaskStatus::Todo), TaskStatus::InProgress);
        assert_eq!(TaskStatus::after_progress(50, TaskStatus::Done), TaskStatus::InProgress);
        assert_eq!(TaskStatus::after_progress(50, TaskStatus::InProgress), TaskStatus::InProgress);
        assert_eq!(TaskStatus::after_progress(1, TaskStatus::Todo), TaskStatus::InProgress);
        assert_eq!(TaskStatus::after_progress(99, TaskStatus::Done), TaskStatus::InProgress);
    }

    #[test]
    fn test_progress_after_status() {
        // done forces 100 regardless of prior progress
        assert_eq!(progress_after_status(TaskStatus::Done, 0), 100);
        assert_eq!(progress_after_status(TaskStatus::Done, 40), 100);
        assert_eq!(progress_after_status(TaskStatus::Done, 100), 100);

        // other statuses leave progress untouched, including the
        // inconsistent combinations this leaves reachable
        assert_eq!(progress_after_status(TaskStatus::Todo, 40), 40);
        assert_eq!(progress_after_status(TaskStatus::InProgress, 40), 40);
        assert_eq!(progress_after_status(TaskStatus::Todo, 100), 100);
    }

    #[test]
    fn test_progress_lifecycle_sequence() {
        // create → 50% → 100%, as driven through progress updates
        let mut task = task_with(TaskStatus::Todo, 0, None);

        task.status = TaskStatus::after_progress(50, task.status);
        task.progress = 50;
        assert_eq!(task.status, TaskStatus::InProgress);

        task.status = TaskStatus::after_progress(100, task.status);
        task.progress = 100;
        assert_eq!(task.status, TaskStatus::Done);

        task.status = TaskStatus::after_progress(0, task.status);
        task.progress = 0;
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn test_valid_priority() {
        assert!(!valid_priority(0));
        assert!(valid_priority(1));
        assert!(valid_priority(3));
        assert!(valid_priority(5));
        assert!(!valid_priority(6));
        assert!(!valid_priority(-1));
    }

    #[test]
    fn test_valid_progress() {
        assert!(valid_progress(0));
        assert!(valid_progress(100));
        assert!(!valid_progress(-1));
        assert!(!valid_progress(101));
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc::now();
        let past = now - Duration::hours(1);
        let future = now + Duration::hours(1);

        // past due date, not done
        assert!(task_with(TaskStatus::Todo, 0, Some(past)).is_overdue(now));
        assert!(task_with(TaskStatus::InProgress, 50, Some(past)).is_overdue(now));

        // done tasks are never overdue
        assert!(!task_with(TaskStatus::Done, 100, Some(past)).is_overdue(now));

        // future or absent due date
        assert!(!task_with(TaskStatus::Todo, 0, Some(future)).is_overdue(now));
        assert!(!task_with(TaskStatus::Todo, 0, None).is_overdue(now));

        // strictly before: a due date equal to "now" is not overdue
        assert!(!task_with(TaskStatus::Todo, 0, Some(now)).is_overdue(now));
    }
}
