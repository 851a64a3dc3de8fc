//! Row store seam.

use async_trait::async_trait;
use linkboard_common::AppResult;

use crate::models::{Favorite, Link, NewLink};

/// Client-side contract of the managed row store.
///
/// The store is the single source of truth for authorization and uniqueness:
/// links are readable and insertable by any authenticated identity but
/// deletable only by their creator, and favorites are fully owner-scoped with
/// a unique constraint on `(user_id, link_id)`. Violations of that constraint
/// surface as [`AppError::Conflict`](linkboard_common::AppError::Conflict),
/// distinguishable from other write failures.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Fetch the full public link set, ordered by creation time descending.
    async fn list_links(&self) -> AppResult<Vec<Link>>;

    /// Insert a link and return the stored row.
    async fn insert_link(&self, new: NewLink) -> AppResult<Link>;

    /// Delete a link by id. The store rejects deletes by non-creators
    /// regardless of any client-side gating.
    async fn delete_link(&self, id: &str) -> AppResult<()>;

    /// Fetch favorite rows scoped to `user_id`.
    async fn list_favorites(&self, user_id: &str) -> AppResult<Vec<Favorite>>;

    /// Point lookup for an existing `(user_id, link_id)` favorite row.
    async fn find_favorite(&self, user_id: &str, link_id: &str) -> AppResult<Option<Favorite>>;

    /// Insert a favorite and return the stored row.
    async fn insert_favorite(&self, user_id: &str, link_id: &str) -> AppResult<Favorite>;

    /// Delete the favorite matched on the exact `(user_id, link_id)` pair.
    async fn delete_favorite(&self, user_id: &str, link_id: &str) -> AppResult<()>;
}
