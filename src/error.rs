//! Error types for the feed client, the post cache and the sync engine.

use thiserror::Error;

/// Failure while fetching a page of posts from the remote site.
///
/// Every variant is recoverable from the engine's point of view: it triggers
/// the cache fallback instead of propagating.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("invalid endpoint url: {0}")]
  Url(#[from] url::ParseError),

  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("server responded with {status}")]
  Status { status: reqwest::StatusCode },

  /// The page body did not decode. The whole page is rejected.
  #[error("malformed posts payload: {0}")]
  Decode(#[from] serde_json::Error),
}

/// Failure in the local post cache. Not recoverable.
#[derive(Debug, Error)]
pub enum CacheError {
  #[error("cache database error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("cached post {id} has an unreadable {field}: {source}")]
  Codec {
    id: i64,
    field: &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("cache io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("cache lock poisoned")]
  LockPoisoned,
}

/// Error returned by sync engine intents.
#[derive(Debug, Error)]
pub enum SyncError {
  #[error(transparent)]
  Cache(#[from] CacheError),
}

pub type CacheResult<T> = Result<T, CacheError>;
pub type SyncResult<T> = Result<T, SyncError>;
