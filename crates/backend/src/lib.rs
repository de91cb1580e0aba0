//! Backend collaborator contract for QuickTask.
//!
//! This crate defines the abstract interfaces the stores talk to: an auth
//! service with a session-change stream, and an owner-scoped row store with
//! per-table change feeds. Two implementations ship with it: an in-memory
//! backend (tests, demos) and a local JSON-file backend (the offline
//! fallback).

mod error;
mod events;
mod feed;
mod local;
mod memory;
mod traits;

pub use error::*;
pub use events::*;
pub use local::*;
pub use memory::*;
pub use traits::*;
