/// Project membership relation and database operations
///
/// Membership is a plain set: a user either belongs to a project or does
/// not. Adding an existing member is a no-op success, and so is removing a
/// non-member. The owner is tracked on the project row itself and may or may
/// not also appear in this relation.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::user::User;

/// A single project membership record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// Member user ID
    pub user_id: Uuid,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl ProjectMember {
    /// Adds a user to a project's member set
    ///
    /// Idempotent: adding a user who is already a member is a no-op success.
    /// Accepts a pool or an open transaction; project creation passes the
    /// transaction that also carries the project insert.
    pub async fn add<'e, E>(executor: E, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, user_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Removes a user from a project's member set
    ///
    /// Removing a non-member is a no-op success (set semantics).
    pub async fn remove(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Checks whether a user is a member of a project
    pub async fn exists(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(found)
    }

    /// Lists the member users of a project
    pub async fn list_users(pool: &PgPool, project_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.full_name, u.password_hash,
                   u.created_at, u.updated_at
            FROM users u
            JOIN project_members pm ON pm.user_id = u.id
            WHERE pm.project_id = $1
            ORDER BY u.username ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Replaces a project's member set with the given users
    ///
    /// Runs on a caller-supplied connection: callers wrap it in the
    /// transaction that also carries the surrounding project write, so a
    /// failure anywhere rolls back the whole replacement and the project
    /// fields together. Duplicate ids in the input collapse to one
    /// membership row.
    pub async fn replace_all(
        conn: &mut PgConnection,
        project_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM project_members WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;

        for user_id in user_ids {
            sqlx::query(
                r#"
                INSERT INTO project_members (project_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT (project_id, user_id) DO NOTHING
                "#,
            )
            .bind(project_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}
