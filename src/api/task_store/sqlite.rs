//! SQLite-based task store (persistent, the default backend).

use super::{
    now_string, validate_title, Task, TaskStore, TaskStoreError, TaskUpdate,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_recency ON tasks(created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(completed);
"#;

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

fn storage(e: impl std::fmt::Display) -> TaskStoreError {
    TaskStoreError::Storage(e.to_string())
}

fn parse_row(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    Ok(Task {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        title: row.get(1)?,
        completed: row.get::<_, i32>(2)? != 0,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl SqliteTaskStore {
    pub async fn new(data_dir: PathBuf) -> Result<Self, TaskStoreError> {
        let db_path = data_dir.join("tasks.db");

        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| storage(format!("Failed to create data dir: {}", e)))?;

        // Open database in blocking task
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| storage(format!("Failed to open SQLite database: {}", e)))?;

            conn.execute_batch(SCHEMA)
                .map_err(|e| storage(format!("Failed to run schema: {}", e)))?;

            Ok::<_, TaskStoreError>(conn)
        })
        .await
        .map_err(storage)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn list_where(&self, completed: Option<bool>) -> Result<Vec<Task>, TaskStoreError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();

            let query = match completed {
                None => {
                    "SELECT id, title, completed, created_at, updated_at
                     FROM tasks
                     ORDER BY created_at DESC, id DESC"
                }
                Some(_) => {
                    "SELECT id, title, completed, created_at, updated_at
                     FROM tasks
                     WHERE completed = ?1
                     ORDER BY created_at DESC, id DESC"
                }
            };

            let mut stmt = conn.prepare(query).map_err(storage)?;

            let tasks = if let Some(flag) = completed {
                stmt.query_map(params![if flag { 1 } else { 0 }], parse_row)
                    .map_err(storage)?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(storage)?
            } else {
                stmt.query_map([], parse_row)
                    .map_err(storage)?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(storage)?
            };

            Ok(tasks)
        })
        .await
        .map_err(storage)?
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn create_task(&self, title: &str) -> Result<Task, TaskStoreError> {
        let title = validate_title(title)?;
        let conn = self.conn.clone();
        let now = now_string();

        let task = Task {
            id: Uuid::new_v4(),
            title,
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        };

        let t = task.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO tasks (id, title, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![t.id.to_string(), t.title, 0, t.created_at, t.updated_at],
            )
            .map_err(storage)?;
            Ok::<_, TaskStoreError>(())
        })
        .await
        .map_err(storage)??;

        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, TaskStoreError> {
        let conn = self.conn.clone();
        let id_str = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.query_row(
                "SELECT id, title, completed, created_at, updated_at
                 FROM tasks WHERE id = ?1",
                params![&id_str],
                parse_row,
            )
            .optional()
            .map_err(storage)
        })
        .await
        .map_err(storage)?
    }

    async fn update_task(&self, id: Uuid, fields: TaskUpdate) -> Result<Task, TaskStoreError> {
        // Validate up front so a bad title has no side effect.
        let new_title = fields.title.as_deref().map(validate_title).transpose()?;
        let new_completed = fields.completed;

        let conn = self.conn.clone();
        let id_str = id.to_string();
        let now = now_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();

            let existing: Option<Task> = conn
                .query_row(
                    "SELECT id, title, completed, created_at, updated_at
                     FROM tasks WHERE id = ?1",
                    params![&id_str],
                    parse_row,
                )
                .optional()
                .map_err(storage)?;

            let mut task = existing.ok_or(TaskStoreError::NotFound(id))?;

            if let Some(title) = new_title {
                task.title = title;
            }
            if let Some(completed) = new_completed {
                task.completed = completed;
            }
            task.updated_at = now;

            conn.execute(
                "UPDATE tasks SET title = ?1, completed = ?2, updated_at = ?3 WHERE id = ?4",
                params![
                    task.title,
                    if task.completed { 1 } else { 0 },
                    task.updated_at,
                    id_str,
                ],
            )
            .map_err(storage)?;

            Ok(task)
        })
        .await
        .map_err(storage)?
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), TaskStoreError> {
        let conn = self.conn.clone();
        let id_str = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let rows = conn
                .execute("DELETE FROM tasks WHERE id = ?1", params![&id_str])
                .map_err(storage)?;
            if rows > 0 {
                Ok(())
            } else {
                Err(TaskStoreError::NotFound(id))
            }
        })
        .await
        .map_err(storage)?
    }

    async fn list_all(&self) -> Result<Vec<Task>, TaskStoreError> {
        self.list_where(None).await
    }

    async fn list_pending(&self) -> Result<Vec<Task>, TaskStoreError> {
        self.list_where(Some(false)).await
    }

    async fn list_completed(&self) -> Result<Vec<Task>, TaskStoreError> {
        self.list_where(Some(true)).await
    }
}
