//! Core services for linkboard.
//!
//! The two components that carry the application's real invariants live here:
//! the session manager ([`SessionService`]) and the link/favorite
//! synchronizer ([`LinkService`]), plus the peripheral share action
//! ([`ShareService`]) and the owned application state object ([`App`]) that
//! wires session transitions to cache refreshes.

pub mod app;
pub mod services;

pub use app::App;
pub use services::links::{LinkService, ToggleOutcome};
pub use services::session::SessionService;
pub use services::share::{ShareOutcome, ShareRequest, ShareService, ShareTarget};
