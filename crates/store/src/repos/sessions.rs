//! Session repository trait.

use crate::error::StoreResult;
use crate::models::{NewSession, SessionRow};
use async_trait::async_trait;
use time::OffsetDateTime;

/// Repository for bearer sessions.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    /// Persist a new session.
    async fn create_session(&self, session: &NewSession) -> StoreResult<SessionRow>;

    /// Look up a session by the hash of its bearer token.
    async fn get_session_by_token_hash(&self, token_hash: &str)
    -> StoreResult<Option<SessionRow>>;

    /// Record that a session was used.
    async fn touch_session(&self, session_id: i64, used_at: OffsetDateTime) -> StoreResult<()>;

    /// Delete sessions that expired before `now`. Returns how many were removed.
    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> StoreResult<u64>;
}
