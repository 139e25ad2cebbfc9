//! Bookmark (replication state) persistence
//!
//! Read at sync start, written after each resource-context completes.
//! Cursor advances are monotonic: a successful sync never moves a bookmark
//! backwards.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{State, StreamState};
