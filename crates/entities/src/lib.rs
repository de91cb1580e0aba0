//! Core entity definitions for QuickTask.
//!
//! This crate defines the data types shared across the QuickTask stores:
//! users, categories, tasks, the persisted row shapes the backend speaks,
//! and the draft/patch types used by create and update operations.

mod category;
mod task;
mod user;

pub use category::*;
pub use task::*;
pub use user::*;
