//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database (default, persistent)

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Maximum title length in characters, after trimming.
pub const MAX_TITLE_LEN: usize = 255;

/// A task (persisted to-do item).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update payload for a task. Absent fields are left untouched,
/// so `completed: Some(false)` is distinguishable from "not supplied".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Errors produced by task store operations.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("task {0} not found")]
    NotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(String),
}

impl TaskStoreError {
    fn title(message: impl Into<String>) -> Self {
        Self::Validation {
            field: "title",
            message: message.into(),
        }
    }
}

/// Get current timestamp as RFC3339 string (UTC, so string order is time order).
pub fn now_string() -> String {
    Utc::now().to_rfc3339()
}

/// Validate and normalize a task title: non-empty after trimming, at most
/// [`MAX_TITLE_LEN`] characters. Returns the trimmed title that gets persisted.
pub fn validate_title(title: &str) -> Result<String, TaskStoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskStoreError::title("must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(TaskStoreError::title(format!(
            "must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Sort tasks into the default listing order: `created_at` descending,
/// ties broken by `id` descending.
pub(crate) fn sort_by_recency(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Create a task from a validated title. The new task is pending
    /// (`completed = false`) with `created_at = updated_at = now`.
    async fn create_task(&self, title: &str) -> Result<Task, TaskStoreError>;

    /// Get a single task by ID.
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, TaskStoreError>;

    /// Apply a partial update. Only supplied fields change; `updated_at`
    /// refreshes. Returns the updated task.
    async fn update_task(&self, id: Uuid, fields: TaskUpdate) -> Result<Task, TaskStoreError>;

    /// Delete a task permanently.
    async fn delete_task(&self, id: Uuid) -> Result<(), TaskStoreError>;

    /// List all tasks, ordered by `created_at` descending (ties by id descending).
    async fn list_all(&self) -> Result<Vec<Task>, TaskStoreError>;

    /// List tasks with `completed = false`, same ordering.
    async fn list_pending(&self) -> Result<Vec<Task>, TaskStoreError>;

    /// List tasks with `completed = true`, same ordering.
    async fn list_completed(&self) -> Result<Vec<Task>, TaskStoreError>;
}

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    Memory,
    #[default]
    Sqlite,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Create a task store based on type and configuration.
pub async fn create_task_store(
    store_type: TaskStoreType,
    data_dir: PathBuf,
) -> Result<Box<dyn TaskStore>, TaskStoreError> {
    match store_type {
        TaskStoreType::Memory => Ok(Box::new(InMemoryTaskStore::new())),
        TaskStoreType::Sqlite => {
            let store = SqliteTaskStore::new(data_dir).await?;
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_task_defaults_to_pending() {
        let store = InMemoryTaskStore::new();

        let task = store
            .create_task("Buy milk")
            .await
            .expect("Failed to create task");

        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed, "New tasks should start pending");
        assert_eq!(task.created_at, task.updated_at);
    }

    #[tokio::test]
    async fn test_create_task_trims_title() {
        let store = InMemoryTaskStore::new();

        let task = store
            .create_task("  Buy milk  ")
            .await
            .expect("Failed to create task");

        assert_eq!(task.title, "Buy milk");
    }

    #[tokio::test]
    async fn test_create_task_ids_are_unique() {
        let store = InMemoryTaskStore::new();

        let a = store.create_task("a").await.expect("create a");
        let b = store.create_task("b").await.expect("create b");

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_titles_rejected() {
        let store = InMemoryTaskStore::new();

        for bad in ["", " ", "\t\n"] {
            let err = store
                .create_task(bad)
                .await
                .expect_err("Empty title should be rejected");
            assert!(matches!(
                err,
                TaskStoreError::Validation { field: "title", .. }
            ));
        }

        let all = store.list_all().await.expect("list");
        assert!(all.is_empty(), "Failed creates must not persist anything");
    }

    #[tokio::test]
    async fn test_title_length_boundary() {
        let store = InMemoryTaskStore::new();

        let at_limit = "x".repeat(MAX_TITLE_LEN);
        store
            .create_task(&at_limit)
            .await
            .expect("255-char title should be accepted");

        let over_limit = "x".repeat(MAX_TITLE_LEN + 1);
        let err = store
            .create_task(&over_limit)
            .await
            .expect_err("256-char title should be rejected");
        assert!(matches!(
            err,
            TaskStoreError::Validation { field: "title", .. }
        ));

        let all = store.list_all().await.expect("list");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_completed_toggles_freely_without_touching_title() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task("Toggle me").await.expect("create");

        let done = store
            .update_task(
                task.id,
                TaskUpdate {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("mark completed");
        assert!(done.completed);

        let undone = store
            .update_task(
                task.id,
                TaskUpdate {
                    completed: Some(false),
                    ..Default::default()
                },
            )
            .await
            .expect("mark pending again");
        assert!(!undone.completed);
        assert_eq!(undone.title, "Toggle me");
    }

    #[tokio::test]
    async fn test_update_only_supplied_fields() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task("Original").await.expect("create");

        let updated = store
            .update_task(
                task.id,
                TaskUpdate {
                    title: Some("Renamed".to_string()),
                    completed: None,
                },
            )
            .await
            .expect("rename");

        assert_eq!(updated.title, "Renamed");
        assert!(!updated.completed, "Omitted field must stay untouched");
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_update_rejects_bad_title_without_side_effect() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task("Keep me").await.expect("create");

        let err = store
            .update_task(
                task.id,
                TaskUpdate {
                    title: Some("   ".to_string()),
                    completed: Some(true),
                },
            )
            .await
            .expect_err("Blank title should be rejected");
        assert!(matches!(err, TaskStoreError::Validation { .. }));

        let current = store
            .get_task(task.id)
            .await
            .expect("get")
            .expect("task exists");
        assert_eq!(current.title, "Keep me");
        assert!(!current.completed, "Failed update must not persist anything");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = InMemoryTaskStore::new();

        let err = store
            .update_task(
                Uuid::new_v4(),
                TaskUpdate {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect_err("Unknown id should be NotFound");
        assert!(matches!(err, TaskStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one_and_repeat_fails() {
        let store = InMemoryTaskStore::new();
        let a = store.create_task("First").await.expect("create a");
        let b = store.create_task("Second").await.expect("create b");

        store.delete_task(a.id).await.expect("delete a");

        let all = store.list_all().await.expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, b.id);

        let err = store
            .delete_task(a.id)
            .await
            .expect_err("Second delete should fail");
        assert!(matches!(err, TaskStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_all_orders_most_recent_first() {
        let store = InMemoryTaskStore::new();
        let first = store.create_task("Older").await.expect("create");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create_task("Newer").await.expect("create");

        let all = store.list_all().await.expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id, "Later-created task lists first");
        assert_eq!(all[1].id, first.id);
    }

    #[tokio::test]
    async fn test_filters_partition_by_completed_flag() {
        let store = InMemoryTaskStore::new();
        let pending = store.create_task("Pending one").await.expect("create");
        let done = store.create_task("Done one").await.expect("create");
        store
            .update_task(
                done.id,
                TaskUpdate {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("complete");

        let pending_list = store.list_pending().await.expect("pending");
        assert_eq!(pending_list.len(), 1);
        assert_eq!(pending_list[0].id, pending.id);

        let completed_list = store.list_completed().await.expect("completed");
        assert_eq!(completed_list.len(), 1);
        assert_eq!(completed_list[0].id, done.id);
    }

    #[test]
    fn test_sort_breaks_created_at_ties_by_id_descending() {
        let now = now_string();
        let mk = |id: Uuid| Task {
            id,
            title: "t".to_string(),
            completed: false,
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        let lo = Uuid::from_u128(1);
        let hi = Uuid::from_u128(2);

        let mut tasks = vec![mk(lo), mk(hi)];
        sort_by_recency(&mut tasks);

        assert_eq!(tasks[0].id, hi);
        assert_eq!(tasks[1].id, lo);
    }

    #[test]
    fn test_store_type_from_str() {
        assert_eq!(TaskStoreType::from_str("memory"), TaskStoreType::Memory);
        assert_eq!(TaskStoreType::from_str("sqlite"), TaskStoreType::Sqlite);
        assert_eq!(TaskStoreType::from_str("db"), TaskStoreType::Sqlite);
        assert_eq!(TaskStoreType::from_str("anything"), TaskStoreType::Sqlite);
    }
}
