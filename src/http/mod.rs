//! Read-only HTTP JSON API backing the browser dashboard.
//!
//! Handlers validate query parameters, call into [`crate::dashboard`] and
//! serialize the resulting views. The loaded table is shared through
//! [`AppState`] and never mutated.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
