//! Share action.

use std::sync::Arc;

use async_trait::async_trait;
use linkboard_backend::models::Link;
use linkboard_common::config::ShareConfig;
use linkboard_common::{AppError, AppResult};
use tracing::debug;

/// Payload handed to a native share capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    /// Share sheet title.
    pub title: String,
    /// Accompanying text.
    pub text: String,
    /// The shared URL.
    pub url: String,
}

/// How a link ended up shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The platform share capability handled it.
    Shared,
    /// The URL was copied to the clipboard instead.
    CopiedToClipboard,
}

/// Platform seam for the share action.
///
/// Failure from either path (user cancellation included) is recoverable and
/// has no effect on any cache.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Whether a native share capability is available.
    fn supports_native_share(&self) -> bool;

    /// Invoke the native share capability.
    async fn native_share(&self, request: &ShareRequest) -> AppResult<()>;

    /// Copy text to the clipboard.
    async fn copy_to_clipboard(&self, text: &str) -> AppResult<()>;
}

/// Shares links via the platform capability, falling back to the clipboard.
pub struct ShareService {
    target: Arc<dyn ShareTarget>,
    clipboard_fallback: bool,
}

impl ShareService {
    /// Create the service.
    #[must_use]
    pub fn new(target: Arc<dyn ShareTarget>, config: &ShareConfig) -> Self {
        Self {
            target,
            clipboard_fallback: config.clipboard_fallback,
        }
    }

    /// Share a link.
    pub async fn share_link(&self, link: &Link) -> AppResult<ShareOutcome> {
        if self.target.supports_native_share() {
            let request = ShareRequest {
                title: link.name.clone(),
                text: format!("Check out {}", link.name),
                url: link.url.clone(),
            };
            self.target.native_share(&request).await?;
            debug!(link_id = %link.id, "shared natively");
            return Ok(ShareOutcome::Shared);
        }

        if self.clipboard_fallback {
            self.target.copy_to_clipboard(&link.url).await?;
            debug!(link_id = %link.id, "copied url to clipboard");
            return Ok(ShareOutcome::CopiedToClipboard);
        }

        Err(AppError::Backend(
            "no share capability available".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::sync::Mutex;

    struct FakeTarget {
        native: bool,
        fail_native: bool,
        copied: Mutex<Vec<String>>,
    }

    impl FakeTarget {
        fn new(native: bool) -> Self {
            Self {
                native,
                fail_native: false,
                copied: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ShareTarget for FakeTarget {
        fn supports_native_share(&self) -> bool {
            self.native
        }

        async fn native_share(&self, _request: &ShareRequest) -> AppResult<()> {
            if self.fail_native {
                return Err(AppError::Backend("share cancelled".to_string()));
            }
            Ok(())
        }

        async fn copy_to_clipboard(&self, text: &str) -> AppResult<()> {
            self.copied.lock().await.push(text.to_string());
            Ok(())
        }
    }

    fn test_link() -> Link {
        Link {
            id: "link1".to_string(),
            name: "rust".to_string(),
            url: "https://rust-lang.org".to_string(),
            user_id: "user1".to_string(),
            user_email: "a@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_native_share_preferred() {
        let target = Arc::new(FakeTarget::new(true));
        let service = ShareService::new(target.clone(), &ShareConfig::default());

        let outcome = service.share_link(&test_link()).await.unwrap();
        assert_eq!(outcome, ShareOutcome::Shared);
        assert!(target.copied.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_clipboard_fallback_copies_url() {
        let target = Arc::new(FakeTarget::new(false));
        let service = ShareService::new(target.clone(), &ShareConfig::default());

        let outcome = service.share_link(&test_link()).await.unwrap();
        assert_eq!(outcome, ShareOutcome::CopiedToClipboard);
        assert_eq!(
            target.copied.lock().await.as_slice(),
            ["https://rust-lang.org"]
        );
    }

    #[tokio::test]
    async fn test_cancellation_is_recoverable() {
        let target = Arc::new(FakeTarget {
            native: true,
            fail_native: true,
            copied: Mutex::new(Vec::new()),
        });
        let service = ShareService::new(target, &ShareConfig::default());

        let err = service.share_link(&test_link()).await.unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
    }
}
