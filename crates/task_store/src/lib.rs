//! Reconciling task and category store for QuickTask.
//!
//! The [`TaskStore`] owns the in-memory task and category collections for
//! the current user. Every mutation is a thin request to the backend; the
//! collections are only ever updated from the backend's change feeds, so the
//! write path and the read-model update path stay fully decoupled.
//!
//! View derivation (filtering, sorting, stats) lives in [`views`] as pure
//! functions over the collections.

mod error;
mod store;
pub mod views;

pub use error::*;
pub use store::*;
