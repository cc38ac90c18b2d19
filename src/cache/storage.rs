//! Cache store implementations: SQLite-backed and no-op.

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::traits::CacheStore;
use crate::error::{CacheError, CacheResult};
use crate::feed::{Post, RenderedText};

/// Store used when caching is disabled - writes are discarded, reads are empty.
pub struct NoopStore;

impl CacheStore for NoopStore {
  fn read_all(&self) -> CacheResult<Vec<Post>> {
    Ok(Vec::new())
  }

  fn replace_all(&self, _posts: &[Post]) -> CacheResult<()> {
    Ok(())
  }

  fn upsert_many(&self, _posts: &[Post]) -> CacheResult<()> {
    Ok(())
  }

  fn count(&self) -> CacheResult<usize> {
    Ok(0)
  }

  fn find_by_id(&self, _id: i64) -> CacheResult<Option<Post>> {
    Ok(None)
  }
}

/// SQLite-based post store.
///
/// All access goes through one connection behind a mutex, so a reader never
/// observes a table that a `replace_all` has only half rewritten.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

/// Schema for the post table. `title` and `excerpt` hold JSON `{"rendered": ..}`.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY,
    published_at TEXT NOT NULL,
    title TEXT NOT NULL,
    excerpt TEXT NOT NULL,
    link TEXT NOT NULL,
    featured_media INTEGER NOT NULL DEFAULT 0,
    featured_media_url TEXT,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_posts_published ON posts(published_at);
"#;

const SELECT_COLUMNS: &str =
  "SELECT id, published_at, title, excerpt, link, featured_media, featured_media_url FROM posts";

const UPSERT_POST: &str = "INSERT OR REPLACE INTO posts
     (id, published_at, title, excerpt, link, featured_media, featured_media_url, cached_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now'))";

impl SqliteStore {
  /// Open (or create) the cache database at `path`.
  pub fn open(path: &Path) -> CacheResult<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    debug!(path = %path.display(), "opened post cache");
    Self::with_connection(conn)
  }

  /// In-memory cache, gone when the store is dropped.
  pub fn open_in_memory() -> CacheResult<Self> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> CacheResult<Self> {
    conn.execute_batch(CACHE_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn lock(&self) -> CacheResult<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|_| CacheError::LockPoisoned)
  }
}

impl CacheStore for SqliteStore {
  fn read_all(&self) -> CacheResult<Vec<Post>> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare(&format!(
      "{SELECT_COLUMNS} ORDER BY published_at DESC, id DESC"
    ))?;

    let rows = stmt
      .query_map([], PostRow::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(PostRow::into_post).collect()
  }

  fn replace_all(&self, posts: &[Post]) -> CacheResult<()> {
    let mut conn = self.lock()?;
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM posts", [])?;
    {
      let mut stmt = tx.prepare_cached(UPSERT_POST)?;
      for post in posts {
        insert_post(&mut stmt, post)?;
      }
    }

    tx.commit()?;
    debug!(count = posts.len(), "replaced cached posts");
    Ok(())
  }

  fn upsert_many(&self, posts: &[Post]) -> CacheResult<()> {
    let mut conn = self.lock()?;
    let tx = conn.transaction()?;
    {
      let mut stmt = tx.prepare_cached(UPSERT_POST)?;
      for post in posts {
        insert_post(&mut stmt, post)?;
      }
    }

    tx.commit()?;
    debug!(count = posts.len(), "merged posts into cache");
    Ok(())
  }

  fn count(&self) -> CacheResult<usize> {
    let conn = self.lock()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
  }

  fn find_by_id(&self, id: i64) -> CacheResult<Option<Post>> {
    let conn = self.lock()?;
    let row = conn
      .query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        PostRow::from_row,
      )
      .optional()?;

    row.map(PostRow::into_post).transpose()
  }
}

fn insert_post(stmt: &mut rusqlite::CachedStatement<'_>, post: &Post) -> CacheResult<()> {
  let title = encode_text(post.id, "title", &post.title)?;
  let excerpt = encode_text(post.id, "excerpt", &post.excerpt)?;

  stmt.execute(params![
    post.id,
    post.published_at,
    title,
    excerpt,
    post.link,
    post.featured_media,
    post.featured_media_url,
  ])?;
  Ok(())
}

fn encode_text(id: i64, field: &'static str, text: &RenderedText) -> CacheResult<String> {
  serde_json::to_string(text).map_err(|source| CacheError::Codec { id, field, source })
}

fn decode_text(id: i64, field: &'static str, raw: &str) -> CacheResult<RenderedText> {
  serde_json::from_str(raw).map_err(|source| CacheError::Codec { id, field, source })
}

/// A post row as stored, before the JSON columns are decoded.
struct PostRow {
  id: i64,
  published_at: String,
  title: String,
  excerpt: String,
  link: String,
  featured_media: i64,
  featured_media_url: Option<String>,
}

impl PostRow {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id: row.get(0)?,
      published_at: row.get(1)?,
      title: row.get(2)?,
      excerpt: row.get(3)?,
      link: row.get(4)?,
      featured_media: row.get(5)?,
      featured_media_url: row.get(6)?,
    })
  }

  fn into_post(self) -> CacheResult<Post> {
    Ok(Post {
      id: self.id,
      title: decode_text(self.id, "title", &self.title)?,
      excerpt: decode_text(self.id, "excerpt", &self.excerpt)?,
      published_at: self.published_at,
      link: self.link,
      featured_media: self.featured_media,
      featured_media_url: self.featured_media_url,
    })
  }
}
