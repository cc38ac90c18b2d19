use chrono::NaiveDateTime;
use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use tracing::debug;

use crate::feed::Post;
use crate::sync::{SyncEngine, SyncState};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Fetch posts page by page, falling back to the cache when offline
  List {
    /// Number of pages to load
    #[arg(short, long, default_value_t = 1)]
    pages: u32,
  },
  /// Discard cached first-page data and reload from page 1
  Refresh,
  /// Show one cached post (never hits the network)
  Show { id: i64 },
  /// Print everything in the cache (never hits the network)
  Cached,
}

pub async fn run(command: Command, engine: &SyncEngine) -> Result<()> {
  debug!(?command, page_size = engine.page_size(), "running command");

  let mut updates = engine.subscribe();
  tokio::spawn(async move {
    while updates.changed().await.is_ok() {
      let state = updates.borrow_and_update();
      debug!(
        phase = ?state.phase(),
        loading = state.is_loading(),
        posts = state.posts.len(),
        page = state.current_page,
        "sync state changed"
      );
    }
  });

  match command {
    Command::List { pages } => {
      engine.load_initial().await?;
      for _ in 1..pages {
        if !engine.snapshot().has_more_pages {
          break;
        }
        engine.load_more().await?;
      }
      report(&engine.snapshot())
    }
    Command::Refresh => {
      engine.refresh().await?;
      report(&engine.snapshot())
    }
    Command::Show { id } => {
      match engine.get_record_by_id(id)? {
        Some(post) => print!("{}", format_detail(&post)),
        None => println!("post {id} is not cached"),
      }
      Ok(())
    }
    Command::Cached => {
      for post in engine.cached_records()? {
        println!("{}", format_line(&post));
      }
      Ok(())
    }
  }
}

/// Print the listing; a failure with nothing to show is an error.
fn report(state: &SyncState) -> Result<()> {
  for post in &state.posts {
    println!("{}", format_line(post));
  }

  match &state.error_message {
    Some(message) if !state.is_degraded() => Err(eyre!("{}", message)),
    Some(message) => {
      eprintln!("warning: {message}");
      Ok(())
    }
    None => {
      if !state.has_more_pages {
        eprintln!("(end of posts)");
      }
      Ok(())
    }
  }
}

fn format_date(raw: &str) -> String {
  NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|_| raw.to_string())
}

fn format_line(post: &Post) -> String {
  format!(
    "{:>8}  {:<16}  {}",
    post.id,
    format_date(&post.published_at),
    post.title.rendered
  )
}

fn format_detail(post: &Post) -> String {
  let mut out = format!(
    "id:        {}\ndate:      {}\ntitle:     {}\nlink:      {}\n",
    post.id,
    format_date(&post.published_at),
    post.title.rendered,
    post.link
  );
  if let Some(url) = &post.featured_media_url {
    out.push_str(&format!("media:     {url}\n"));
  } else if post.featured_media != 0 {
    out.push_str(&format!("media:     #{}\n", post.featured_media));
  }
  out.push_str(&format!("\n{}\n", post.excerpt.rendered));
  out
}
