//! In-memory backend for service tests.
//!
//! Plays the role of the managed backend while enforcing the same contracts:
//! owner-only link deletion, owner-scoped favorites, and a unique constraint
//! on `(user_id, link_id)` reported as a distinguishable conflict. Store
//! operations are counted so tests can assert that locally gated actions
//! issued no call at all, and small injection hooks simulate transport
//! failures and the race window between a point lookup and an insert.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linkboard_common::{AppError, AppResult};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::AuthProvider;
use crate::models::{Favorite, Link, NewLink, Session, User};
use crate::store::LinkStore;

/// In-memory [`AuthProvider`] + [`LinkStore`].
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    links: Vec<Link>,
    favorites: Vec<Favorite>,
    calls: HashMap<&'static str, usize>,
    fail_next: Option<&'static str>,
    blind_next_lookup: bool,
    clock: i64,
}

struct Account {
    password: String,
    user: User,
}

impl Inner {
    fn record(&mut self, op: &'static str) -> AppResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        self.fail_if(op)
    }

    // Auth operations use this directly: they can fail on demand but are
    // not store calls, so they stay out of the call counters.
    fn fail_if(&mut self, op: &'static str) -> AppResult<()> {
        if self.fail_next.take_if(|f| *f == op).is_some() {
            return Err(AppError::Backend("injected failure".to_string()));
        }
        Ok(())
    }

    fn acting_user(&self) -> AppResult<User> {
        self.session
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(AppError::Unauthenticated)
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::from_timestamp(1_700_000_000 + self.clock, 0).unwrap_or_else(Utc::now)
    }
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the given store operation was called.
    pub async fn calls(&self, op: &str) -> usize {
        *self.inner.lock().await.calls.get(op).unwrap_or(&0)
    }

    /// Total number of store operations issued.
    pub async fn total_store_calls(&self) -> usize {
        self.inner.lock().await.calls.values().sum()
    }

    /// Make the next call to `op` fail with a transport error.
    pub async fn fail_next(&self, op: &'static str) {
        self.inner.lock().await.fail_next = Some(op);
    }

    /// Make the next favorite point-lookup miss even when a row exists,
    /// simulating a concurrent writer landing between the lookup and the
    /// subsequent insert.
    pub async fn blind_next_favorite_lookup(&self) {
        self.inner.lock().await.blind_next_lookup = true;
    }

    /// Insert a favorite row directly, bypassing the client path.
    pub async fn seed_favorite(&self, user_id: &str, link_id: &str) -> Favorite {
        let mut inner = self.inner.lock().await;
        let created_at = inner.tick();
        let favorite = Favorite {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            link_id: link_id.to_string(),
            created_at,
        };
        inner.favorites.push(favorite.clone());
        favorite
    }

    /// All link rows currently in the store, unordered.
    pub async fn links_in_store(&self) -> Vec<Link> {
        self.inner.lock().await.links.clone()
    }

    /// All favorite rows for `user_id` currently in the store.
    pub async fn favorites_in_store(&self, user_id: &str) -> Vec<Favorite> {
        self.inner
            .lock()
            .await
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Session> {
        let mut inner = self.inner.lock().await;
        inner.fail_if("sign_up")?;
        if inner.accounts.contains_key(email) {
            return Err(AppError::Conflict("user already registered".to_string()));
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        };
        inner.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            user,
        };
        inner.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let mut inner = self.inner.lock().await;
        inner.fail_if("sign_in")?;
        let user = match inner.accounts.get(email) {
            Some(account) if account.password == password => account.user.clone(),
            _ => return Err(AppError::Backend("invalid login credentials".to_string())),
        };
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            user,
        };
        inner.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        // On failure the provider keeps its session; only a successful call
        // invalidates it.
        inner.fail_if("sign_out")?;
        inner.session = None;
        Ok(())
    }

    async fn current_session(&self) -> AppResult<Option<Session>> {
        Ok(self.inner.lock().await.session.clone())
    }
}

#[async_trait]
impl LinkStore for MemoryBackend {
    async fn list_links(&self) -> AppResult<Vec<Link>> {
        let mut inner = self.inner.lock().await;
        inner.record("list_links")?;
        inner.acting_user()?;
        let mut links = inner.links.clone();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn insert_link(&self, new: NewLink) -> AppResult<Link> {
        let mut inner = self.inner.lock().await;
        inner.record("insert_link")?;
        inner.acting_user()?;
        let created_at = inner.tick();
        let link = Link {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            url: new.url,
            user_id: new.user_id,
            user_email: new.user_email,
            created_at,
        };
        inner.links.push(link.clone());
        Ok(link)
    }

    async fn delete_link(&self, id: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record("delete_link")?;
        let acting = inner.acting_user()?;
        let owner = inner
            .links
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.user_id.clone());
        if let Some(owner_id) = owner {
            if owner_id != acting.id {
                return Err(AppError::Forbidden(
                    "row-level policy rejected the delete".to_string(),
                ));
            }
            inner.links.retain(|l| l.id != id);
        }
        Ok(())
    }

    async fn list_favorites(&self, user_id: &str) -> AppResult<Vec<Favorite>> {
        let mut inner = self.inner.lock().await;
        inner.record("list_favorites")?;
        let acting = inner.acting_user()?;
        // Row-level policy: only the owner's rows are visible.
        Ok(inner
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id && f.user_id == acting.id)
            .cloned()
            .collect())
    }

    async fn find_favorite(&self, user_id: &str, link_id: &str) -> AppResult<Option<Favorite>> {
        let mut inner = self.inner.lock().await;
        inner.record("find_favorite")?;
        let acting = inner.acting_user()?;
        if std::mem::take(&mut inner.blind_next_lookup) {
            return Ok(None);
        }
        Ok(inner
            .favorites
            .iter()
            .find(|f| f.user_id == user_id && f.link_id == link_id && f.user_id == acting.id)
            .cloned())
    }

    async fn insert_favorite(&self, user_id: &str, link_id: &str) -> AppResult<Favorite> {
        let mut inner = self.inner.lock().await;
        inner.record("insert_favorite")?;
        let acting = inner.acting_user()?;
        if acting.id != user_id {
            return Err(AppError::Forbidden(
                "row-level policy rejected the insert".to_string(),
            ));
        }
        if inner
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.link_id == link_id)
        {
            return Err(AppError::Conflict(
                "duplicate key value violates unique constraint \"favorites_user_id_link_id_key\""
                    .to_string(),
            ));
        }
        let created_at = inner.tick();
        let favorite = Favorite {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            link_id: link_id.to_string(),
            created_at,
        };
        inner.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn delete_favorite(&self, user_id: &str, link_id: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record("delete_favorite")?;
        let acting = inner.acting_user()?;
        inner
            .favorites
            .retain(|f| !(f.user_id == user_id && f.link_id == link_id && f.user_id == acting.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_favorite_uniqueness_enforced() {
        let backend = MemoryBackend::new();
        let session = backend.sign_up("a@example.com", "secret123").await.unwrap();
        let user_id = session.user.id;

        backend.insert_favorite(&user_id, "link1").await.unwrap();
        let err = backend.insert_favorite(&user_id, "link1").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(backend.favorites_in_store(&user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_link_rejected_for_non_creator() {
        let backend = MemoryBackend::new();
        let creator = backend.sign_up("a@example.com", "secret123").await.unwrap();
        let link = backend
            .insert_link(NewLink {
                name: "rust".to_string(),
                url: "https://rust-lang.org".to_string(),
                user_id: creator.user.id.clone(),
                user_email: creator.user.email.clone(),
            })
            .await
            .unwrap();

        backend.sign_up("b@example.com", "secret123").await.unwrap();
        let err = backend.delete_link(&link.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(backend.links_in_store().await.len(), 1);
    }

    #[tokio::test]
    async fn test_favorites_not_visible_to_other_users() {
        let backend = MemoryBackend::new();
        let a = backend.sign_up("a@example.com", "secret123").await.unwrap();
        backend.insert_favorite(&a.user.id, "link1").await.unwrap();

        backend.sign_up("b@example.com", "secret123").await.unwrap();
        let visible = backend.list_favorites(&a.user.id).await.unwrap();
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn test_blind_lookup_fires_once() {
        let backend = MemoryBackend::new();
        let session = backend.sign_up("a@example.com", "secret123").await.unwrap();
        let user_id = session.user.id;
        backend.seed_favorite(&user_id, "link1").await;

        backend.blind_next_favorite_lookup().await;
        assert!(backend.find_favorite(&user_id, "link1").await.unwrap().is_none());
        assert!(backend.find_favorite(&user_id, "link1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_provider_session() {
        let backend = MemoryBackend::new();
        backend.sign_up("a@example.com", "secret123").await.unwrap();

        backend.fail_next("sign_out").await;
        assert!(backend.sign_out().await.is_err());
        assert!(backend.current_session().await.unwrap().is_some());

        backend.sign_out().await.unwrap();
        assert!(backend.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let backend = MemoryBackend::new();
        backend.sign_up("a@example.com", "secret123").await.unwrap();

        backend.fail_next("list_links").await;
        assert!(backend.list_links().await.is_err());
        assert!(backend.list_links().await.is_ok());
        assert_eq!(backend.calls("list_links").await, 2);
    }
}
