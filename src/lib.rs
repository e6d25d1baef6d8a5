//! # taskdeck
//!
//! A minimal self-hosted task list with server-rendered pages.
//!
//! This library provides:
//! - An HTTP API for creating, updating, deleting, and listing tasks
//! - A pluggable task store (in-memory or SQLite)
//! - A server-rendered index page reflecting the current task list
//!
//! ## Request Flow
//! 1. Handler validates the request
//! 2. Task store performs at most one mutation
//! 3. Handler re-reads the full ordered task list
//! 4. Response carries the full list (HTML for `/`, JSON elsewhere)
//!
//! ## Modules
//! - `api`: HTTP routes, request/response types, task store, page rendering
//! - `config`: environment-driven configuration

pub mod api;
pub mod config;

pub use config::Config;
