//! Paged loading of posts with cache write-through and offline fallback.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::SyncState;
use crate::cache::CacheStore;
use crate::error::SyncResult;
use crate::feed::{Post, RemoteSource};

/// Shown when a fetch failed but the cache had posts to serve instead.
pub const FALLBACK_MESSAGE: &str = "Network error. Showing cached data.";

const GENERIC_ERROR: &str = "An error occurred";

/// Serves a paged list of posts, writing through to the cache and falling
/// back to it when the remote source fails.
///
/// Cloning is cheap; clones share state, so intents can be spawned as tasks.
#[derive(Clone)]
pub struct SyncEngine {
  inner: Arc<Inner>,
}

struct Inner {
  remote: Arc<dyn RemoteSource>,
  cache: Arc<dyn CacheStore>,
  page_size: u32,
  state: watch::Sender<SyncState>,
}

impl SyncEngine {
  pub fn new(remote: Arc<dyn RemoteSource>, cache: Arc<dyn CacheStore>, page_size: u32) -> Self {
    let (state, _) = watch::channel(SyncState::default());
    Self {
      inner: Arc::new(Inner {
        remote,
        cache,
        page_size,
        state,
      }),
    }
  }

  /// Live view of the state. Every update is published as one snapshot.
  pub fn subscribe(&self) -> watch::Receiver<SyncState> {
    self.inner.state.subscribe()
  }

  pub fn snapshot(&self) -> SyncState {
    self.inner.state.borrow().clone()
  }

  pub fn page_size(&self) -> u32 {
    self.inner.page_size
  }

  /// Load the first page. Use `refresh` to start over after paging.
  pub async fn load_initial(&self) -> SyncResult<()> {
    self.load_first_page(false).await
  }

  /// Request the next page.
  ///
  /// Dropped while another page is in flight or after an empty page marked
  /// the end of the list.
  pub async fn load_more(&self) -> SyncResult<()> {
    let mut next_page = None;
    self.inner.state.send_if_modified(|s| {
      if s.is_loading_more || !s.has_more_pages {
        return false;
      }
      s.current_page += 1;
      s.is_loading_more = true;
      next_page = Some(s.current_page);
      true
    });

    match next_page {
      Some(page) => self.sync_page(page).await,
      None => {
        debug!("load_more ignored: page in flight or no more pages");
        Ok(())
      }
    }
  }

  /// Drop the accumulated list and reload from page 1.
  pub async fn refresh(&self) -> SyncResult<()> {
    self.load_first_page(true).await
  }

  /// Clear the error message, leaving everything else as is.
  pub fn clear_error(&self) {
    self
      .inner
      .state
      .send_if_modified(|s| s.error_message.take().is_some());
  }

  /// Cached post by id. Never touches the network.
  pub fn get_record_by_id(&self, id: i64) -> SyncResult<Option<Post>> {
    Ok(self.inner.cache.find_by_id(id)?)
  }

  /// Everything in the cache, newest first. Never touches the network.
  pub fn cached_records(&self) -> SyncResult<Vec<Post>> {
    Ok(self.inner.cache.read_all()?)
  }

  /// Later pages set their loading marker in `load_more`, together with the guard.
  async fn load_first_page(&self, is_refresh: bool) -> SyncResult<()> {
    self.inner.state.send_modify(|s| {
      if is_refresh {
        s.posts.clear();
        s.current_page = 1;
        s.has_more_pages = true;
      }
      s.is_initial_loading = true;
    });

    self.sync_page(1).await
  }

  /// Fetch `page` and publish the outcome. Loading flags must already be set.
  async fn sync_page(&self, page: u32) -> SyncResult<()> {
    let result = self.fetch_and_merge(page).await;
    if result.is_err() {
      // Cache faults propagate, but the flags must not stay stuck on
      self.inner.state.send_modify(|s| {
        s.is_initial_loading = false;
        s.is_loading_more = false;
      });
    }
    result
  }

  async fn fetch_and_merge(&self, page: u32) -> SyncResult<()> {
    let cache = &self.inner.cache;

    // Only counted up front; the fallback reads the cache fresh after a failure
    let cached_before = cache.count()?;
    debug!(page, cached = cached_before, "fetching page");

    match self.inner.remote.fetch_page(page, self.inner.page_size).await {
      Ok(posts) => {
        if page == 1 {
          cache.replace_all(&posts)?;
        } else {
          cache.upsert_many(&posts)?;
        }

        let fetched = posts.len();
        self.inner.state.send_modify(move |s| {
          if page == 1 {
            s.posts = posts;
          } else {
            s.posts.extend(posts);
          }
          // Only an empty page proves the list is exhausted
          s.has_more_pages = fetched > 0;
          s.error_message = None;
          s.is_initial_loading = false;
          s.is_loading_more = false;
        });
        info!(page, fetched, "page synced");
      }
      Err(err) => {
        let cached = cache.count()?;
        warn!(page, cached, error = %err, "fetch failed, falling back to cache");

        if cached > 0 {
          let posts = cache.read_all()?;
          self.inner.state.send_modify(move |s| {
            s.posts = posts;
            s.error_message = Some(FALLBACK_MESSAGE.to_string());
            s.is_initial_loading = false;
            s.is_loading_more = false;
          });
        } else {
          let mut message = err.to_string();
          if message.is_empty() {
            message = GENERIC_ERROR.to_string();
          }
          self.inner.state.send_modify(move |s| {
            s.error_message = Some(message);
            s.is_initial_loading = false;
            s.is_loading_more = false;
          });
        }
      }
    }

    Ok(())
  }
}
