//! Client-side session state for QuickTask.
//!
//! The [`SessionStore`] is the single source of truth for who is logged in.
//! It delegates credential operations to the auth backend and lets the
//! backend's session-change stream, not the operations' return values, drive
//! its state.

mod error;
mod store;

pub use error::*;
pub use store::*;
