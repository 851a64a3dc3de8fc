//! Managed backend client for linkboard.
//!
//! All durable state lives in an external managed backend: an identity
//! service for sessions and a row store with per-row authorization policies.
//! This crate defines the client-side seams for both and the concrete
//! implementations:
//!
//! - [`AuthProvider`]: sign-up, password sign-in, persisted-session
//!   retrieval, sign-out.
//! - [`LinkStore`]: the row operations the synchronizer needs (ordered
//!   select, insert-with-return, delete-with-match-predicate, point lookup),
//!   with unique-constraint violations distinguishable from other failures.
//! - [`HttpBackend`]: reqwest implementation of both traits against
//!   GoTrue/PostgREST-style endpoints.
//! - `test_utils::MemoryBackend` (feature `test-utils`): in-memory
//!   implementation enforcing the same row-level policy and uniqueness
//!   contracts, for service tests.

pub mod auth;
pub mod http;
pub mod models;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use auth::AuthProvider;
pub use http::HttpBackend;
pub use models::{Favorite, Link, NewLink, Session, User};
pub use store::LinkStore;
