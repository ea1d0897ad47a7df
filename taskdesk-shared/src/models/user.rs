/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user accounts.
/// Each user owns zero or more tasks; the `role` column decides whether the user
/// may see and modify other users' tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,      -- BIGSERIAL on PostgreSQL
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin'))
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{User, CreateUser, Role};
/// use taskdesk_shared::db::{connect, pool::DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = connect(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::User,
/// }).await?;
///
/// let found = User::find_by_username(&pool, "alice").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::AnyPool;
use std::fmt;

/// Coarse permission level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sees and manages only their own tasks
    #[default]
    User,

    /// Sees and manages every task
    Admin,
}

impl Role {
    /// Converts role to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a role string that is neither `user` nor `admin`
#[derive(Debug, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct RoleParseError(pub String);

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(RoleParseError(value)),
        }
    }
}

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the hash
/// is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique across all users
    pub username: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Permission level
    #[sqlx(try_from = "String")]
    pub role: Role,
}

/// Public view of a user, safe to return from the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login name (must not already exist)
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Initial role, normally `Role::User`
    pub role: Role,
}

const USER_COLUMNS: &str = "id, username, password_hash, role";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists (unique constraint
    /// violation) or the database connection fails.
    pub async fn create(pool: &AnyPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.password_hash)
            .bind(data.role.as_str())
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &AnyPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by username
    ///
    /// Lookup is exact (case-sensitive).
    pub async fn find_by_username(
        pool: &AnyPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Lists users ordered by ID
    ///
    /// # Arguments
    ///
    /// * `skip` - Number of users to skip
    /// * `limit` - Maximum number of users to return
    pub async fn list(pool: &AnyPool, skip: i64, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    /// Changes a user's role
    ///
    /// Returns true if the user existed.
    pub async fn set_role(pool: &AnyPool, id: i64, role: Role) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts total number of users
    pub async fn count(pool: &AnyPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
