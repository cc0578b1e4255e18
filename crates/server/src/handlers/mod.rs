//! HTTP request handlers.

pub mod auth;
pub mod categories;
pub mod common;
pub mod health;
pub mod products;

pub use auth::*;
pub use categories::*;
pub use health::*;
pub use products::*;
