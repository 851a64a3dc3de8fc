//! Session manager.

use std::sync::Arc;

use linkboard_backend::models::Session;
use linkboard_backend::AuthProvider;
use linkboard_common::AppResult;
use tokio::sync::watch;
use tracing::debug;

/// Tracks the current authenticated identity and publishes every transition.
///
/// Transitions (sign-in, sign-up, sign-out) are published on a watch channel;
/// subscribers hold a receiver for the lifetime of the application and drop
/// it on teardown. The cache-refresh coupling lives in
/// [`App`](crate::App), not here, so this service stays testable on its own.
pub struct SessionService {
    auth: Arc<dyn AuthProvider>,
    tx: watch::Sender<Option<Session>>,
}

impl SessionService {
    /// Create the service, seeding it with any persisted session the
    /// provider still considers valid.
    pub async fn init(auth: Arc<dyn AuthProvider>) -> AppResult<Self> {
        let existing = auth.current_session().await?;
        if existing.is_some() {
            debug!("resuming persisted session");
        }
        let (tx, _rx) = watch::channel(existing);
        Ok(Self { auth, tx })
    }

    /// Subscribe to session transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Create a new account. Provider-reported errors are surfaced verbatim.
    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<Session> {
        let session = self.auth.sign_up(email, password).await?;
        self.tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Sign in with email and password. Provider-reported errors are
    /// surfaced verbatim.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let session = self.auth.sign_in(email, password).await?;
        self.tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Sign out. The local session is cleared unconditionally, even when the
    /// provider call fails, so subscribers always observe the transition.
    pub async fn sign_out(&self) -> AppResult<()> {
        let result = self.auth.sign_out().await;
        self.tx.send_replace(None);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkboard_backend::test_utils::MemoryBackend;

    #[tokio::test]
    async fn test_sign_in_publishes_session() {
        let backend = Arc::new(MemoryBackend::new());
        backend.sign_up("a@example.com", "secret123").await.unwrap();
        backend.sign_out().await.unwrap();

        let service = SessionService::init(backend).await.unwrap();
        let rx = service.subscribe();
        assert!(service.current().is_none());

        service.sign_in("a@example.com", "secret123").await.unwrap();
        assert_eq!(
            rx.borrow().as_ref().map(|s| s.user.email.clone()),
            Some("a@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_sign_in_error_surfaced_verbatim() {
        let backend = Arc::new(MemoryBackend::new());
        let service = SessionService::init(backend).await.unwrap();

        let err = service
            .sign_in("a@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "backend error: invalid login credentials");
        assert!(service.current().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_publishes_none() {
        let backend = Arc::new(MemoryBackend::new());
        backend.sign_up("a@example.com", "secret123").await.unwrap();

        let service = SessionService::init(backend).await.unwrap();
        assert!(service.current().is_some());

        service.sign_out().await.unwrap();
        assert!(service.current().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_even_when_provider_fails() {
        let backend = Arc::new(MemoryBackend::new());
        backend.sign_up("a@example.com", "secret123").await.unwrap();

        let service = SessionService::init(backend.clone()).await.unwrap();
        let rx = service.subscribe();
        backend.fail_next("sign_out").await;

        let err = service.sign_out().await.unwrap_err();
        assert!(matches!(err, linkboard_common::AppError::Backend(_)));
        assert!(service.current().is_none());
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_init_resumes_persisted_session() {
        let backend = Arc::new(MemoryBackend::new());
        backend.sign_up("a@example.com", "secret123").await.unwrap();

        let service = SessionService::init(backend).await.unwrap();
        assert_eq!(
            service.current().map(|s| s.user.email),
            Some("a@example.com".to_string())
        );
    }
}
