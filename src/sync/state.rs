use crate::feed::Post;

/// Externally observable state of the sync engine.
///
/// Only the engine writes it; consumers read snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
  /// Posts in arrival order (page 1 first)
  pub posts: Vec<Post>,
  pub is_initial_loading: bool,
  pub is_loading_more: bool,
  /// Advisory message; may coexist with `posts` when serving cached data
  pub error_message: Option<String>,
  /// Last page requested, 1-based
  pub current_page: u32,
  pub has_more_pages: bool,
}

impl Default for SyncState {
  fn default() -> Self {
    Self {
      posts: Vec::new(),
      is_initial_loading: false,
      is_loading_more: false,
      error_message: None,
      current_page: 1,
      has_more_pages: true,
    }
  }
}

/// Coarse classification of a `SyncState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
  /// Nothing loaded or requested yet
  Idle,
  InitialLoading,
  LoadingMore,
  Loaded,
  /// Fetch failed and there was nothing cached to show
  ErrorNoData,
  /// Fetch failed, posts are served from the cache
  ErrorWithFallback,
}

impl SyncState {
  pub fn is_loading(&self) -> bool {
    self.is_initial_loading || self.is_loading_more
  }

  /// An error is being shown alongside data.
  pub fn is_degraded(&self) -> bool {
    self.error_message.is_some() && !self.posts.is_empty()
  }

  pub fn phase(&self) -> SyncPhase {
    if self.is_initial_loading {
      SyncPhase::InitialLoading
    } else if self.is_loading_more {
      SyncPhase::LoadingMore
    } else if self.error_message.is_some() {
      if self.posts.is_empty() {
        SyncPhase::ErrorNoData
      } else {
        SyncPhase::ErrorWithFallback
      }
    } else if self.posts.is_empty() && self.current_page == 1 && self.has_more_pages {
      SyncPhase::Idle
    } else {
      SyncPhase::Loaded
    }
  }
}
