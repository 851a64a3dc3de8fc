//! Identity provider seam.

use async_trait::async_trait;
use linkboard_common::AppResult;

use crate::models::Session;

/// Client-side contract of the managed identity service.
///
/// Provider-reported errors are surfaced verbatim to callers; nothing here
/// retries or rewrites them.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create a new account and return its session.
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Session>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session>;

    /// Invalidate the current session.
    async fn sign_out(&self) -> AppResult<()>;

    /// Retrieve any persisted session.
    ///
    /// Called once on startup so an application restart resumes the previous
    /// identity when the provider still considers it valid.
    async fn current_session(&self) -> AppResult<Option<Session>>;
}
