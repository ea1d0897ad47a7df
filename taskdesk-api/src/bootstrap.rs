/// Startup admin account provisioning
///
/// Sign-up only ever creates regular users, so the first admin has to come
/// from configuration. When `ADMIN_USERNAME` and `ADMIN_PASSWORD` are set
/// the account is created with the admin role, or promoted if it already
/// exists. An existing account keeps its password.

use sqlx::AnyPool;
use taskdesk_shared::{
    auth::password::hash_password_blocking,
    models::user::{CreateUser, Role, User},
};
use tracing::info;

use crate::config::AdminConfig;

/// What [`ensure_admin`] had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created,
    Promoted,
    AlreadyAdmin,
}

/// Makes sure the configured admin account exists with the admin role
pub async fn ensure_admin(pool: &AnyPool, admin: &AdminConfig) -> anyhow::Result<AdminBootstrap> {
    if let Some(user) = User::find_by_username(pool, &admin.username).await? {
        if user.role.is_admin() {
            return Ok(AdminBootstrap::AlreadyAdmin);
        }

        User::set_role(pool, user.id, Role::Admin).await?;
        info!(user_id = user.id, username = %user.username, "Promoted existing user to admin");
        return Ok(AdminBootstrap::Promoted);
    }

    let password_hash = hash_password_blocking(admin.password.clone()).await?;
    let user = User::create(
        pool,
        CreateUser {
            username: admin.username.clone(),
            password_hash,
            role: Role::Admin,
        },
    )
    .await?;

    info!(user_id = user.id, username = %user.username, "Created admin account");
    Ok(AdminBootstrap::Created)
}
