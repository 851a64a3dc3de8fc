//! Link/favorite synchronizer.
//!
//! Maintains two local caches, the shared link list (newest first) and the
//! current user's favorite set, kept consistent with the remote store under
//! user-initiated mutations. The store is the single source of truth for
//! authorization and uniqueness; the caches are best-effort read replicas
//! refreshed after each acknowledged mutation, never mutated on failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use linkboard_backend::models::{Favorite, Link, NewLink, Session};
use linkboard_backend::LinkStore;
use linkboard_common::{AppError, AppResult};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};
use validator::Validate;

/// Result of a favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The link was favorited.
    Added,
    /// The link was unfavorited.
    Removed,
    /// Another session for the same account favorited the link first.
    /// Benign; the surviving row was adopted into the local cache.
    AlreadyFavorited,
}

/// Link/favorite synchronizer.
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    session: watch::Receiver<Option<Session>>,
    links: RwLock<Vec<Link>>,
    favorites: RwLock<Vec<Favorite>>,
    loading: AtomicBool,
}

#[derive(Debug, Validate)]
struct NewLinkInput {
    #[validate(length(min = 1, max = 200))]
    name: String,
    #[validate(url)]
    url: String,
}

impl LinkService {
    /// Create a synchronizer with empty caches.
    #[must_use]
    pub fn new(store: Arc<dyn LinkStore>, session: watch::Receiver<Option<Session>>) -> Self {
        Self {
            store,
            session,
            links: RwLock::new(Vec::new()),
            favorites: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
        }
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Snapshot of the link cache, newest first.
    pub async fn links(&self) -> Vec<Link> {
        self.links.read().await.clone()
    }

    /// Snapshot of the current user's favorite cache.
    pub async fn favorites(&self) -> Vec<Favorite> {
        self.favorites.read().await.clone()
    }

    /// Whether a link fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Whether the local cache holds a favorite for `link_id`.
    pub async fn is_favorited(&self, link_id: &str) -> bool {
        self.favorites
            .read()
            .await
            .iter()
            .any(|f| f.link_id == link_id)
    }

    /// Fetch the full public link set, newest first.
    ///
    /// On failure the prior cache is left untouched and the error is
    /// returned; the loading flag is cleared on both paths.
    pub async fn fetch_links(&self) -> AppResult<()> {
        self.loading.store(true, Ordering::Release);
        let result = self.store.list_links().await;
        self.loading.store(false, Ordering::Release);

        let list = result?;
        debug!(count = list.len(), "fetched links");
        *self.links.write().await = list;
        Ok(())
    }

    /// Fetch the current user's favorite rows. No-op without a session;
    /// failure does not clear the existing cache.
    pub async fn fetch_favorites(&self) -> AppResult<()> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };
        let rows = self.store.list_favorites(&session.user.id).await?;
        debug!(count = rows.len(), "fetched favorites");
        *self.favorites.write().await = rows;
        Ok(())
    }

    /// Submit a new link attributed to the current session's identity.
    ///
    /// On acknowledgment the full link list is re-fetched rather than
    /// inserted optimistically, so the cache keeps the server-side
    /// descending creation order.
    pub async fn add_link(&self, name: &str, url: &str) -> AppResult<()> {
        let Some(session) = self.current_session() else {
            return Err(AppError::Unauthenticated);
        };
        let input = NewLinkInput {
            name: name.to_string(),
            url: url.to_string(),
        };
        input.validate()?;

        self.store
            .insert_link(NewLink {
                name: input.name,
                url: input.url,
                user_id: session.user.id,
                user_email: session.user.email,
            })
            .await?;

        self.fetch_links().await
    }

    /// Delete a link by id.
    ///
    /// Locally gated on the current session's email matching
    /// `creator_email` before any store call. The gate is a latency
    /// optimization layered on top of the store's own policy, which still
    /// rejects unauthorized deletes on its own.
    pub async fn delete_link(&self, id: &str, creator_email: &str) -> AppResult<()> {
        let Some(session) = self.current_session() else {
            return Err(AppError::Unauthenticated);
        };
        if session.user.email != creator_email {
            return Err(AppError::Forbidden(
                "only the creator can delete a link".to_string(),
            ));
        }

        self.store.delete_link(id).await?;
        self.links.write().await.retain(|l| l.id != id);
        Ok(())
    }

    /// Toggle the current user's favorite for `link_id`.
    ///
    /// The unfavorited path re-checks the store with a point lookup before
    /// inserting, and treats a uniqueness violation on the insert itself as
    /// the benign "already favorited" outcome: both tolerate another
    /// tab/session for the same account racing this one. After the call
    /// completes, local cache membership for the pair matches the store's.
    pub async fn toggle_favorite(&self, link_id: &str) -> AppResult<ToggleOutcome> {
        let Some(session) = self.current_session() else {
            return Err(AppError::Unauthenticated);
        };
        let user_id = session.user.id;

        let favorited = self
            .favorites
            .read()
            .await
            .iter()
            .any(|f| f.link_id == link_id);

        if favorited {
            self.store.delete_favorite(&user_id, link_id).await?;
            self.favorites
                .write()
                .await
                .retain(|f| !(f.link_id == link_id && f.user_id == user_id));
            return Ok(ToggleOutcome::Removed);
        }

        if let Some(existing) = self.store.find_favorite(&user_id, link_id).await? {
            info!(link_id, "favorite already exists, adopting row");
            self.favorites.write().await.push(existing);
            return Ok(ToggleOutcome::AlreadyFavorited);
        }

        match self.store.insert_favorite(&user_id, link_id).await {
            Ok(row) => {
                self.favorites.write().await.push(row);
                Ok(ToggleOutcome::Added)
            }
            Err(AppError::Conflict(_)) => {
                // A concurrent writer landed between the lookup and the
                // insert. Adopt the surviving row so cache membership
                // matches the store.
                info!(link_id, "favorite insert lost the race, already favorited");
                if let Ok(Some(existing)) = self.store.find_favorite(&user_id, link_id).await {
                    self.favorites.write().await.push(existing);
                }
                Ok(ToggleOutcome::AlreadyFavorited)
            }
            Err(err) => Err(err),
        }
    }

    /// Empty both caches. Called when the session becomes absent.
    pub async fn clear(&self) {
        self.links.write().await.clear();
        self.favorites.write().await.clear();
    }
}
