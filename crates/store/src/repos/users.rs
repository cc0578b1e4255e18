//! User repository trait.

use crate::error::StoreResult;
use crate::models::{NewUser, UserRow};
use async_trait::async_trait;

/// Repository for user accounts.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create a new user. Returns `AlreadyExists` if the email is taken.
    async fn create_user(&self, user: &NewUser) -> StoreResult<UserRow>;

    /// Get a user by id.
    async fn get_user(&self, user_id: i64) -> StoreResult<Option<UserRow>>;

    /// Get a user by email.
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>>;
}
