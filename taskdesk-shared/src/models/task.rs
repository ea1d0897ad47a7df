/// Task model and database operations
///
/// A task is a unit of work with a title, an optional description and a
/// status, owned by exactly one user.
///
/// # Status values
///
/// ```text
/// pending | in_progress | done
/// ```
///
/// Any status may be set from any other; updates overwrite title,
/// description and status together in a single statement.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,      -- BIGSERIAL on PostgreSQL
///     title TEXT NOT NULL,
///     description TEXT,
///     status TEXT NOT NULL DEFAULT 'pending'
///         CHECK (status IN ('pending', 'in_progress', 'done')),
///     owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
/// use taskdesk_shared::db::{connect, pool::DatabaseConfig};
///
/// # async fn example(owner_id: i64) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = connect(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Write report".to_string(),
///     description: None,
/// }, owner_id).await?;
///
/// Task::update(&pool, task.id, UpdateTask {
///     title: "Write report".to_string(),
///     description: Some("Quarterly numbers".to_string()),
///     status: TaskStatus::InProgress,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, AnyPool, FromRow, Row, ValueRef};
use std::{fmt, str::FromStr};

/// Task progress state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Pending,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Every status, in display order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done];

    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a status string outside the three allowed values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid task status: {0} (expected pending, in_progress or done)")]
pub struct StatusParseError(pub String);

impl FromStr for TaskStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = StatusParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Short title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// User who owns the task
    pub owner_id: i64,
}

// The Any driver reports a NULL column with no type, which `Option<String>`
// refuses to decode, so nullability is checked on the raw value first.
impl<'r> FromRow<'r, AnyRow> for Task {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        let description = if row.try_get_raw("description")?.is_null() {
            None
        } else {
            Some(row.try_get::<String, _>("description")?)
        };

        let status = row
            .try_get::<String, _>("status")?
            .parse::<TaskStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description,
            status,
            owner_id: row.try_get("owner_id")?,
        })
    }
}

impl Task {
    /// Whether `user_id` owns this task
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }
}

/// Input for creating a new task
///
/// New tasks always start as `pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
}

/// Input for replacing a task's mutable fields
///
/// Every field is written; there are no partial-patch semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

const TASK_COLUMNS: &str = "id, title, description, status, owner_id";

impl Task {
    /// Creates a new pending task owned by `owner_id`
    ///
    /// # Errors
    ///
    /// Returns an error if `owner_id` does not reference an existing user
    /// (foreign key violation) or the database connection fails.
    pub async fn create(
        pool: &AnyPool,
        data: CreateTask,
        owner_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, status, owner_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(TaskStatus::Pending.as_str())
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &AnyPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists every task regardless of owner, ordered by ID
    pub async fn list(pool: &AnyPool, skip: i64, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks ORDER BY id LIMIT $1 OFFSET $2",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    /// Lists the tasks owned by one user, ordered by ID
    pub async fn list_by_owner(
        pool: &AnyPool,
        owner_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE owner_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    /// Overwrites title, description and status in one statement
    ///
    /// Returns the updated task, or `None` if no task has this ID.
    pub async fn update(
        pool: &AnyPool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET title = $1, description = $2, status = $3 WHERE id = $4 RETURNING {}",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a task by ID
    ///
    /// Returns true if a row was removed.
    pub async fn delete(pool: &AnyPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the tasks owned by one user
    pub async fn count_by_owner(pool: &AnyPool, owner_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect, pool::DatabaseConfig};
    use crate::models::user::{CreateUser, Role, User};

    async fn setup() -> (AnyPool, User, User) {
        let pool = connect(DatabaseConfig::in_memory()).await.unwrap();
        let alice = User::create(
            &pool,
            CreateUser {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            },
        )
        .await
        .unwrap();
        let bob = User::create(
            &pool,
            CreateUser {
                username: "bob".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            },
        )
        .await
        .unwrap();
        (pool, alice, bob)
    }

    fn create(title: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_status_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert_eq!(
            "finished".parse::<TaskStatus>(),
            Err(StatusParseError("finished".to_string()))
        );
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: TaskStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(status, TaskStatus::Done);
        assert!(serde_json::from_str::<TaskStatus>("\"archived\"").is_err());
    }

    #[tokio::test]
    async fn test_create_defaults_to_pending() {
        let (pool, alice, _) = setup().await;

        let task = Task::create(
            &pool,
            CreateTask {
                title: "Write report".to_string(),
                description: Some("Q3".to_string()),
            },
            alice.id,
        )
        .await
        .unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.owner_id, alice.id);
        assert_eq!(task.description.as_deref(), Some("Q3"));
        assert!(task.is_owned_by(alice.id));

        let found = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
        assert_eq!(found, task);
    }

    #[tokio::test]
    async fn test_task_without_description_reads_back() {
        let (pool, alice, _) = setup().await;

        let task = Task::create(&pool, create("no notes"), alice.id).await.unwrap();
        assert_eq!(task.description, None);

        let found = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
        assert_eq!(found.description, None);

        let updated = Task::update(
            &pool,
            task.id,
            UpdateTask {
                title: "still no notes".to_string(),
                description: None,
                status: TaskStatus::InProgress,
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.status, TaskStatus::InProgress);

        let mine = Task::list_by_owner(&pool, alice.id, 0, 100).await.unwrap();
        assert_eq!(mine, vec![updated.clone()]);
        assert_eq!(Task::list(&pool, 0, 100).await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn test_create_requires_existing_owner() {
        let (pool, _, _) = setup().await;

        let result = Task::create(&pool, create("orphan"), 4242).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_by_owner_is_scoped() {
        let (pool, alice, bob) = setup().await;

        Task::create(&pool, create("a1"), alice.id).await.unwrap();
        Task::create(&pool, create("b1"), bob.id).await.unwrap();
        Task::create(&pool, create("a2"), alice.id).await.unwrap();

        let mine = Task::list_by_owner(&pool, alice.id, 0, 100).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|t| t.owner_id == alice.id));
        assert_eq!(mine[0].title, "a1");
        assert_eq!(mine[1].title, "a2");

        let all = Task::list(&pool, 0, 100).await.unwrap();
        assert_eq!(all.len(), 3);

        let page = Task::list(&pool, 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "b1");

        assert_eq!(Task::count_by_owner(&pool, alice.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let (pool, alice, _) = setup().await;

        let task = Task::create(
            &pool,
            CreateTask {
                title: "draft".to_string(),
                description: Some("old".to_string()),
            },
            alice.id,
        )
        .await
        .unwrap();

        let updated = Task::update(
            &pool,
            task.id,
            UpdateTask {
                title: "final".to_string(),
                description: None,
                status: TaskStatus::Done,
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.title, "final");
        assert_eq!(updated.description, None);
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.owner_id, alice.id);

        let stored = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let (pool, _, _) = setup().await;

        let result = Task::update(
            &pool,
            999,
            UpdateTask {
                title: "x".to_string(),
                description: None,
                status: TaskStatus::Pending,
            },
        )
        .await
        .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (pool, alice, _) = setup().await;

        let task = Task::create(&pool, create("temp"), alice.id).await.unwrap();

        assert!(Task::delete(&pool, task.id).await.unwrap());
        assert!(Task::find_by_id(&pool, task.id).await.unwrap().is_none());
        assert!(!Task::delete(&pool, task.id).await.unwrap());
    }
}
