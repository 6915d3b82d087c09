/// User model and database operations
///
/// Users are referenced, never owned, by projects and tasks: a project holds
/// its owner and members by id, a task holds its assignee by id. Identity
/// fields are immutable once the account exists.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     full_name VARCHAR(100) NOT NULL,
///     password_hash TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Login name (unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Argon2id password hash (never serialized to clients)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    /// Login name
    pub username: String,

    /// Email address
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Pre-hashed password (hashing happens in the auth layer)
    pub password_hash: String,
}

impl User {
    /// Creates a new user account
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email already exists (unique
    /// constraint violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, full_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, full_name, password_hash, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.full_name)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, full_name, password_hash, created_at, updated_at
            FROM users
            ORDER BY username ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Checks whether a user exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice Doe".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("argon2id"));
    }
}
