//! Post model and the remote source that serves posts one page at a time.

mod api_types;
mod client;
mod types;

pub use client::WpClient;
pub use types::{Post, RenderedText};

use async_trait::async_trait;

use crate::error::FetchError;

/// A paged source of posts.
///
/// Implementations make a single attempt per call; retry policy, if any,
/// belongs to the caller.
#[async_trait]
pub trait RemoteSource: Send + Sync {
  /// Fetch one page (1-based) of at most `per_page` posts.
  async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Post>, FetchError>;
}
