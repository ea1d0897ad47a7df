/// Authorization helpers and permission checks
///
/// # Permission Model
///
/// 1. **Roles**: every user is either `user` or `admin`
/// 2. **Ownership**: a regular user may only touch tasks they own
/// 3. **Admin override**: admins may read, change and delete every task
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::authorization::{require_task_access, TaskAction};
/// use taskdesk_shared::auth::middleware::AuthContext;
/// use taskdesk_shared::models::task::Task;
///
/// fn check(auth: &AuthContext, task: &Task) -> Result<(), String> {
///     require_task_access(auth, task, TaskAction::Update).map_err(|e| e.to_string())
/// }
/// ```

use super::middleware::AuthContext;
use crate::models::task::Task;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller lacks the role an endpoint needs
    #[error("Not enough permissions")]
    InsufficientRole { required: Role, actual: Role },

    /// Caller neither owns the task nor is an admin
    #[error("Not authorized to {action} this task")]
    NotOwner { action: TaskAction },
}

/// What the caller is trying to do with a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Access,
    Update,
    Delete,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskAction::Access => "access",
            TaskAction::Update => "update",
            TaskAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for TaskAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that the caller is an admin
///
/// # Errors
///
/// Returns `AuthzError::InsufficientRole` for regular users
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_admin() {
        return Err(AuthzError::InsufficientRole {
            required: Role::Admin,
            actual: auth.role,
        });
    }

    Ok(())
}

/// Checks that the caller may perform `action` on `task`
///
/// Owners always pass; everyone else needs the admin role.
pub fn require_task_access(
    auth: &AuthContext,
    task: &Task,
    action: TaskAction,
) -> Result<(), AuthzError> {
    if task.is_owned_by(auth.user_id) || auth.is_admin() {
        return Ok(());
    }

    Err(AuthzError::NotOwner { action })
}
