//! HTTP implementation of the backend seams.
//!
//! Talks to a managed backend exposing GoTrue-style identity endpoints under
//! `/auth/v1` and PostgREST-style row endpoints under `/rest/v1`. Row
//! requests carry the session's bearer token so the store's row-level
//! policies apply to every read and write.

use std::time::Duration;

use async_trait::async_trait;
use linkboard_common::config::BackendConfig;
use linkboard_common::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::AuthProvider;
use crate::models::{Favorite, Link, NewLink, Session, User};
use crate::store::LinkStore;

/// PostgreSQL unique-constraint violation, as reported by the row store.
const UNIQUE_VIOLATION: &str = "23505";

/// reqwest-based client for the managed backend.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    session: RwLock<Option<Session>>,
}

impl HttpBackend {
    /// Create a client from configuration.
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| AppError::Config(format!("invalid api key: {e}")))?;
        headers.insert("apikey", api_key);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        })
    }

    async fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.read().await.as_ref() {
            Some(session) => builder.bearer_auth(&session.access_token),
            None => builder,
        }
    }

    async fn sign_in_with(&self, url: String, email: &str, password: &str) -> AppResult<Session> {
        let resp = self
            .client
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let resp = check(resp).await?;

        let auth: AuthResponse = resp.json().await?;
        let session = Session {
            access_token: auth.access_token,
            user: User {
                id: auth.user.id,
                email: auth.user.email.unwrap_or_default(),
            },
        };

        *self.session.write().await = Some(session.clone());
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for HttpBackend {
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Session> {
        debug!(email, "signing up");
        self.sign_in_with(format!("{}/auth/v1/signup", self.base_url), email, password)
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        debug!(email, "signing in");
        self.sign_in_with(
            format!("{}/auth/v1/token?grant_type=password", self.base_url),
            email,
            password,
        )
        .await
    }

    async fn sign_out(&self) -> AppResult<()> {
        let token = self.session.write().await.take();
        if let Some(session) = token {
            let resp = self
                .client
                .post(format!("{}/auth/v1/logout", self.base_url))
                .bearer_auth(&session.access_token)
                .send()
                .await?;
            check(resp).await?;
        }
        Ok(())
    }

    async fn current_session(&self) -> AppResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }
}

#[async_trait]
impl LinkStore for HttpBackend {
    async fn list_links(&self) -> AppResult<Vec<Link>> {
        let req = self
            .client
            .get(format!("{}/rest/v1/links", self.base_url))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let resp = self.authed(req).await.send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn insert_link(&self, new: NewLink) -> AppResult<Link> {
        let req = self
            .client
            .post(format!("{}/rest/v1/links", self.base_url))
            .header("Prefer", "return=representation")
            .json(&new);
        let resp = self.authed(req).await.send().await?;
        let rows: Vec<Link> = check(resp).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Backend("insert returned no row".to_string()))
    }

    async fn delete_link(&self, id: &str) -> AppResult<()> {
        let req = self
            .client
            .delete(format!("{}/rest/v1/links", self.base_url))
            .query(&[("id", format!("eq.{id}"))]);
        let resp = self.authed(req).await.send().await?;
        check(resp).await?;
        Ok(())
    }

    async fn list_favorites(&self, user_id: &str) -> AppResult<Vec<Favorite>> {
        let req = self
            .client
            .get(format!("{}/rest/v1/favorites", self.base_url))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
            ]);
        let resp = self.authed(req).await.send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn find_favorite(&self, user_id: &str, link_id: &str) -> AppResult<Option<Favorite>> {
        let req = self
            .client
            .get(format!("{}/rest/v1/favorites", self.base_url))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("link_id", format!("eq.{link_id}")),
                ("limit", "1".to_string()),
            ]);
        let resp = self.authed(req).await.send().await?;
        let mut rows: Vec<Favorite> = check(resp).await?.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn insert_favorite(&self, user_id: &str, link_id: &str) -> AppResult<Favorite> {
        let req = self
            .client
            .post(format!("{}/rest/v1/favorites", self.base_url))
            .header("Prefer", "return=representation")
            .json(&json!({ "user_id": user_id, "link_id": link_id }));
        let resp = self.authed(req).await.send().await?;
        let rows: Vec<Favorite> = check(resp).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Backend("insert returned no row".to_string()))
    }

    async fn delete_favorite(&self, user_id: &str, link_id: &str) -> AppResult<()> {
        let req = self
            .client
            .delete(format!("{}/rest/v1/favorites", self.base_url))
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("link_id", format!("eq.{link_id}")),
            ]);
        let resp = self.authed(req).await.send().await?;
        check(resp).await?;
        Ok(())
    }
}

/// Identity response shape shared by signup and token endpoints.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

/// Error payload shape shared by the identity and row endpoints.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

impl ErrorBody {
    fn text(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .unwrap_or_else(|| "request failed".to_string())
    }
}

async fn check(resp: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(map_error(status, &body))
}

fn map_error(status: StatusCode, body: &str) -> AppError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) {
        return AppError::Conflict(parsed.text());
    }
    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthenticated,
        StatusCode::FORBIDDEN => AppError::Forbidden(parsed.text()),
        StatusCode::NOT_FOUND => AppError::NotFound(parsed.text()),
        StatusCode::CONFLICT => AppError::Conflict(parsed.text()),
        _ => AppError::Backend(format!("{}: {}", status.as_u16(), parsed.text())),
    }
}
