//! The store contract the sync engine depends on.

use crate::error::CacheResult;
use crate::feed::Post;

/// Durable table of posts keyed by id.
///
/// Writing a post whose id is already stored replaces the stored version.
pub trait CacheStore: Send + Sync {
  /// All cached posts, newest `published_at` first.
  fn read_all(&self) -> CacheResult<Vec<Post>>;

  /// Clear the table and insert `posts`, atomically.
  ///
  /// Only meant for a fresh first page; later pages go through `upsert_many`.
  fn replace_all(&self, posts: &[Post]) -> CacheResult<()>;

  /// Insert or replace by id, keeping posts not in `posts`.
  fn upsert_many(&self, posts: &[Post]) -> CacheResult<()>;

  fn count(&self) -> CacheResult<usize>;

  fn find_by_id(&self, id: i64) -> CacheResult<Option<Post>>;
}
