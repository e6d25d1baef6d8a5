//! In-memory task store (non-persistent).

use super::{
    now_string, sort_by_recency, validate_title, Task, TaskStore, TaskStoreError, TaskUpdate,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn collect_where(&self, pred: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| pred(t))
            .cloned()
            .collect();
        sort_by_recency(&mut tasks);
        tasks
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn create_task(&self, title: &str) -> Result<Task, TaskStoreError> {
        let title = validate_title(title)?;
        let now = now_string();
        let task = Task {
            id: Uuid::new_v4(),
            title,
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        };
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, TaskStoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn update_task(&self, id: Uuid, fields: TaskUpdate) -> Result<Task, TaskStoreError> {
        // Validate before taking the write lock so a bad title has no side effect.
        let new_title = fields.title.as_deref().map(validate_title).transpose()?;

        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(TaskStoreError::NotFound(id))?;

        if let Some(title) = new_title {
            task.title = title;
        }
        if let Some(completed) = fields.completed {
            task.completed = completed;
        }
        task.updated_at = now_string();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), TaskStoreError> {
        match self.tasks.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(TaskStoreError::NotFound(id)),
        }
    }

    async fn list_all(&self) -> Result<Vec<Task>, TaskStoreError> {
        Ok(self.collect_where(|_| true).await)
    }

    async fn list_pending(&self) -> Result<Vec<Task>, TaskStoreError> {
        Ok(self.collect_where(|t| !t.completed).await)
    }

    async fn list_completed(&self) -> Result<Vec<Task>, TaskStoreError> {
        Ok(self.collect_where(|t| t.completed).await)
    }
}
