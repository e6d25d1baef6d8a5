//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;

use super::page;
use super::task_store::{self, TaskStore, TaskStoreError, TaskUpdate};
use super::types::*;

/// Shared application state.
pub struct AppState {
    /// The task store backend (memory or sqlite)
    pub store: Box<dyn TaskStore>,
}

/// Error wrapper translating store failures into HTTP responses.
#[derive(Debug)]
pub struct ApiError(TaskStoreError);

impl From<TaskStoreError> for ApiError {
    fn from(err: TaskStoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            TaskStoreError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorResponse::single(field, message)),
            )
                .into_response(),
            TaskStoreError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": format!("Task {} not found", id) })),
            )
                .into_response(),
            TaskStoreError::Storage(message) => {
                tracing::error!("Storage failure: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "internal storage error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store =
        task_store::create_task_store(config.store_type, config.data_dir.clone()).await?;
    if !store.is_persistent() {
        tracing::warn!("Using in-memory task store; tasks will not survive restarts");
    }

    let state = Arc::new(AppState { store });

    let app = router(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router.
fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Re-read the full, freshly-ordered task list. Every mutation response
/// carries this, never just the affected task.
async fn full_list(state: &AppState) -> Result<Json<TaskListResponse>, ApiError> {
    let tasks = state.store.list_all().await?;
    Ok(Json(TaskListResponse { tasks }))
}

/// Render the index page with the current task list.
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let tasks = state.store.list_all().await?;
    Ok(Html(page::render_page(&tasks)))
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        persistent: state.store.is_persistent(),
    })
}

/// Query parameters for listing tasks.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    filter: Option<String>,
}

/// List tasks as JSON, optionally filtered by completion state.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTasksQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let tasks = match params.filter.as_deref() {
        None | Some("all") => state.store.list_all().await?,
        Some("pending") => state.store.list_pending().await?,
        Some("completed") => state.store.list_completed().await?,
        Some(other) => {
            return Err(ApiError(TaskStoreError::Validation {
                field: "filter",
                message: format!("unknown filter '{}'", other),
            }))
        }
    };
    Ok(Json(TaskListResponse { tasks }))
}

/// Get a single task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<task_store::Task>, ApiError> {
    state
        .store
        .get_task(id)
        .await?
        .map(Json)
        .ok_or(ApiError(TaskStoreError::NotFound(id)))
}

/// Create a new task, then return the full task list.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let task = state.store.create_task(&req.title).await?;
    tracing::debug!("Created task {}", task.id);
    full_list(&state).await
}

/// Apply a partial update, then return the full task list.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(fields): Json<TaskUpdate>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let task = state.store.update_task(id, fields).await?;
    tracing::debug!("Updated task {}", task.id);
    full_list(&state).await
}

/// Delete a task, then return the full task list (task absent).
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskListResponse>, ApiError> {
    state.store.delete_task(id).await?;
    tracing::debug!("Deleted task {}", id);
    full_list(&state).await
}
