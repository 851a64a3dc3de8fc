//! Owned application state and the session-to-cache update cycle.

use std::sync::Arc;

use linkboard_backend::{AuthProvider, LinkStore};
use linkboard_common::config::ShareConfig;
use linkboard_common::AppResult;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::services::links::LinkService;
use crate::services::session::SessionService;
use crate::services::share::{ShareService, ShareTarget};

/// The application state object: the session manager, the synchronizer and
/// the share action, owned together so the update cycle between them is
/// explicit rather than ambient.
pub struct App {
    /// Session manager.
    pub session: SessionService,
    /// Link/favorite synchronizer.
    pub links: Arc<LinkService>,
    /// Share action.
    pub share: ShareService,
}

impl App {
    /// Wire the services to a backend and share target.
    pub async fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn LinkStore>,
        target: Arc<dyn ShareTarget>,
        share_config: &ShareConfig,
    ) -> AppResult<Self> {
        let session = SessionService::init(auth).await?;
        let links = Arc::new(LinkService::new(store, session.subscribe()));
        let share = ShareService::new(target, share_config);
        Ok(Self {
            session,
            links,
            share,
        })
    }

    /// Run the update cycle for one session state: a present session
    /// refreshes both caches, an absent one clears them. Refresh failures
    /// are recoverable and logged, not propagated; the caches keep their
    /// prior contents.
    pub async fn apply_session_change(links: &LinkService, signed_in: bool) {
        if signed_in {
            if let Err(err) = links.fetch_links().await {
                warn!(%err, "link refresh after session change failed");
            }
            if let Err(err) = links.fetch_favorites().await {
                warn!(%err, "favorite refresh after session change failed");
            }
        } else {
            links.clear().await;
        }
    }

    /// Spawn the listener driving [`Self::apply_session_change`] for the
    /// current session state and every subsequent transition. The task ends
    /// when the session channel closes on teardown.
    pub fn spawn_session_listener(&self) -> JoinHandle<()> {
        let mut rx = self.session.subscribe();
        let links = self.links.clone();
        tokio::spawn(async move {
            loop {
                let signed_in = rx.borrow_and_update().is_some();
                Self::apply_session_change(&links, signed_in).await;
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkboard_backend::test_utils::MemoryBackend;
    use linkboard_common::AppResult;

    struct NullShare;

    #[async_trait::async_trait]
    impl ShareTarget for NullShare {
        fn supports_native_share(&self) -> bool {
            false
        }

        async fn native_share(
            &self,
            _request: &crate::services::share::ShareRequest,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn copy_to_clipboard(&self, _text: &str) -> AppResult<()> {
            Ok(())
        }
    }

    async fn build_app(backend: &Arc<MemoryBackend>) -> App {
        App::new(
            backend.clone(),
            backend.clone(),
            Arc::new(NullShare),
            &ShareConfig::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_transition_populates_caches() {
        let backend = Arc::new(MemoryBackend::new());
        let seed = backend.sign_up("a@example.com", "secret123").await.unwrap();
        backend
            .insert_link(linkboard_backend::models::NewLink {
                name: "rust".to_string(),
                url: "https://rust-lang.org".to_string(),
                user_id: seed.user.id.clone(),
                user_email: seed.user.email.clone(),
            })
            .await
            .unwrap();
        backend.seed_favorite(&seed.user.id, "link1").await;
        backend.sign_out().await.unwrap();

        let app = build_app(&backend).await;
        app.session
            .sign_in("a@example.com", "secret123")
            .await
            .unwrap();
        App::apply_session_change(&app.links, true).await;

        assert_eq!(app.links.links().await.len(), 1);
        assert_eq!(app.links.favorites().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_transition_clears_caches() {
        let backend = Arc::new(MemoryBackend::new());
        let seed = backend.sign_up("a@example.com", "secret123").await.unwrap();
        backend
            .insert_link(linkboard_backend::models::NewLink {
                name: "rust".to_string(),
                url: "https://rust-lang.org".to_string(),
                user_id: seed.user.id.clone(),
                user_email: seed.user.email.clone(),
            })
            .await
            .unwrap();

        let app = build_app(&backend).await;
        App::apply_session_change(&app.links, true).await;
        assert_eq!(app.links.links().await.len(), 1);

        app.session.sign_out().await.unwrap();
        App::apply_session_change(&app.links, false).await;

        assert!(app.links.links().await.is_empty());
        assert!(app.links.favorites().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_prior_caches() {
        let backend = Arc::new(MemoryBackend::new());
        let seed = backend.sign_up("a@example.com", "secret123").await.unwrap();
        backend
            .insert_link(linkboard_backend::models::NewLink {
                name: "rust".to_string(),
                url: "https://rust-lang.org".to_string(),
                user_id: seed.user.id.clone(),
                user_email: seed.user.email.clone(),
            })
            .await
            .unwrap();

        let app = build_app(&backend).await;
        App::apply_session_change(&app.links, true).await;
        assert_eq!(app.links.links().await.len(), 1);

        backend.fail_next("list_links").await;
        App::apply_session_change(&app.links, true).await;
        assert_eq!(app.links.links().await.len(), 1);
    }
}
