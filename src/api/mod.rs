//! HTTP API for taskdeck.
//!
//! ## Endpoints
//!
//! - `GET /` - Server-rendered page with the current task list
//! - `GET /api/health` - Health check
//! - `GET /tasks` - List tasks as JSON (`?filter=pending|completed`)
//! - `GET /tasks/{id}` - Get a single task
//! - `POST /tasks` - Create a task; responds with the full task list
//! - `PATCH /tasks/{id}` - Partially update a task; responds with the full task list
//! - `DELETE /tasks/{id}` - Delete a task; responds with the full task list

pub mod page;
mod routes;
pub mod task_store;
pub mod types;

pub use routes::serve;
pub use types::*;
