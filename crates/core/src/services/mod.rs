//! Service layer.

pub mod links;
pub mod session;
pub mod share;
