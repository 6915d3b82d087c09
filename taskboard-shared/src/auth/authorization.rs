/// Authorization checks for projects and tasks
///
/// Two relationships gate every mutation:
///
/// 1. **Ownership**: project-level mutations (update, delete, membership
///    changes) require the caller to be the project's owner.
/// 2. **Access**: task-level mutations require the caller to be the owner
///    of the task's project or a member of it.
///
/// Task access is defined transitively through the task's project, so both
/// checks operate on a loaded [`Project`]. The caller identity is always an
/// explicit argument.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{require_project_access, require_project_owner};
/// use taskboard_shared::models::project::Project;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project: Project, caller: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Owner-only operation
/// require_project_owner(&project, caller)?;
///
/// // Owner-or-member operation
/// require_project_access(&pool, &project, caller).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::project_member::ProjectMember;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not the project's owner
    #[error("Only the project owner may perform this operation")]
    NotOwner,

    /// Caller is neither owner nor member of the project
    #[error("No access to this project")]
    NoAccess,

    /// Database error while checking membership
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Requires that the caller owns the project
///
/// # Errors
///
/// Returns `AuthzError::NotOwner` if the caller is not the owner
pub fn require_project_owner(project: &Project, caller: Uuid) -> Result<(), AuthzError> {
    if !project.is_owned_by(caller) {
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}

/// Decides owner-or-member access from the resolved relationships
///
/// Pure counterpart of [`require_project_access`]: the caller has access
/// when they own the project or the membership lookup found them.
pub fn has_access(project: &Project, caller: Uuid, is_member: bool) -> bool {
    project.is_owned_by(caller) || is_member
}

/// Requires that the caller is the project's owner or one of its members
///
/// The owner check is resolved from the loaded project; the member check
/// queries the membership relation (skipped for the owner).
///
/// # Errors
///
/// Returns `AuthzError::NoAccess` if the caller has neither relationship
pub async fn require_project_access(
    pool: &PgPool,
    project: &Project,
    caller: Uuid,
) -> Result<(), AuthzError> {
    let is_member = if project.is_owned_by(caller) {
        false
    } else {
        ProjectMember::exists(pool, project.id, caller).await?
    };

    if !has_access(project, caller, is_member) {
        return Err(AuthzError::NoAccess);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::ProjectStatus;
    use chrono::Utc;

    fn project_owned_by(owner_id: Uuid) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Website".to_string(),
            description: None,
            start_date: Utc::now(),
            due_date: None,
            status: ProjectStatus::Active,
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_project_owner() {
        let owner = Uuid::new_v4();
        let project = project_owned_by(owner);

        assert!(require_project_owner(&project, owner).is_ok());
        assert!(matches!(
            require_project_owner(&project, Uuid::new_v4()),
            Err(AuthzError::NotOwner)
        ));
    }

    #[test]
    fn test_has_access_owner_member_neither() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let project = project_owned_by(owner);

        // the owner needs no membership row
        assert!(has_access(&project, owner, false));

        // a non-owner member passes
        assert!(has_access(&project, member, true));

        // neither owner nor member is denied
        assert!(!has_access(&project, stranger, false));
    }

    #[test]
    fn test_authz_error_display() {
        assert!(AuthzError::NotOwner.to_string().contains("owner"));
        assert!(AuthzError::NoAccess.to_string().contains("access"));
    }
}
