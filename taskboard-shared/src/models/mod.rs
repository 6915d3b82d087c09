/// Database models for Taskboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts (immutable identity once created)
/// - `project`: Projects with a single owner and a member set
/// - `project_member`: The project↔user membership relation
/// - `task`: Tasks with the status/progress coupling
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     full_name: "Alice Doe".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod project;
pub mod project_member;
pub mod task;
pub mod user;
