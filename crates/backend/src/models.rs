//! Data model shared between the backend client and the services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shared URL entry with creator attribution.
///
/// Publicly readable by any authenticated identity; deletable only by its
/// creator (enforced server-side by row-level policy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Opaque unique id, assigned by the store.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Target URL.
    pub url: String,

    /// Creator's user id.
    pub user_id: String,

    /// Creator's email. Display and ownership label only, not a secure
    /// foreign key.
    pub user_email: String,

    /// When the link was created.
    pub created_at: DateTime<Utc>,
}

/// A per-user bookmark relation on a [`Link`].
///
/// At most one row exists per `(user_id, link_id)` pair; the store enforces
/// the constraint and reports violations with a distinguishable error code.
/// Rows are visible only to their owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    /// Opaque unique id, assigned by the store.
    pub id: String,

    /// Owning user.
    pub user_id: String,

    /// Favorited link.
    pub link_id: String,

    /// When the favorite was created.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new link.
#[derive(Clone, Debug, Serialize)]
pub struct NewLink {
    /// Display name.
    pub name: String,
    /// Target URL.
    pub url: String,
    /// Creator's user id.
    pub user_id: String,
    /// Creator's email.
    pub user_email: String,
}

/// An authenticated identity as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user id.
    pub id: String,
    /// Email address the user signed up with.
    pub email: String,
}

/// The current authenticated session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token presented to the row store so its policies apply.
    pub access_token: String,
    /// The authenticated user.
    pub user: User,
}
