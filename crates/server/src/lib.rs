//! HTTP API server for the stockroom inventory system.
//!
//! This crate provides the REST control plane:
//! - Signup/login with bearer sessions
//! - Category CRUD with find-or-create resolution
//! - Product CRUD with input normalization
//! - Flattened product views for the dashboard

pub mod auth;
pub mod error;
pub mod handlers;
pub mod password;
pub mod routes;
pub mod state;

pub use auth::TraceId;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
