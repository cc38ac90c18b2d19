//! Local post cache for offline support.
//!
//! The cache is a single table of posts keyed by id:
//! - page 1 refreshes replace the whole table
//! - later pages are merged in by id
//! - reads never touch the network

mod storage;
mod traits;

pub use storage::{NoopStore, SqliteStore};
pub use traits::CacheStore;
