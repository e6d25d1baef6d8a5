//! API request and response types.

use crate::api::task_store::Task;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request to create a new task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    /// The task title (trimmed before persisting)
    pub title: String,
}

/// Response carried by every successful mutation and by `GET /tasks`:
/// the full, freshly-ordered task list.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Field-level validation errors, keyed by field name.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationErrorResponse {
    pub fn single(field: &str, message: String) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), vec![message]);
        Self { errors }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Whether the configured store persists across restarts
    pub persistent: bool,
}
