//! Sync engine: merges remote pages, the local cache and in-memory state.

mod engine;
mod state;

pub use engine::SyncEngine;
pub use state::{SyncPhase, SyncState};
