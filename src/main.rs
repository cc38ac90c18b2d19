mod cache;
mod cli;
mod config;
mod error;
mod feed;
mod sync;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use cache::{CacheStore, NoopStore, SqliteStore};
use config::{Config, LogConfig};
use feed::WpClient;
use sync::SyncEngine;

#[derive(Parser, Debug)]
#[command(name = "wpfeed")]
#[command(about = "An offline-tolerant reader for WordPress post feeds")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/wpfeed/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Site base URL, overrides the config file
  #[arg(short, long, global = true)]
  url: Option<String>,

  #[command(subcommand)]
  command: Option<cli::Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let config = Config::load(args.config.as_deref(), args.url.as_deref())?;
  let _log_guard = init_tracing(&config.log)?;

  let engine = build_engine(&config)?;
  let command = args.command.unwrap_or(cli::Command::List { pages: 1 });
  cli::run(command, &engine).await
}

/// Wire the remote source and cache into the engine, once per process.
fn build_engine(config: &Config) -> Result<SyncEngine> {
  let remote = WpClient::new(&config.site)?;
  tracing::debug!(endpoint = %remote.endpoint(), "remote source ready");

  let cache: Arc<dyn CacheStore> = if config.cache.enabled {
    let path = config.cache_path()?;
    Arc::new(SqliteStore::open(&path)?)
  } else {
    tracing::info!("post cache disabled, offline fallback unavailable");
    Arc::new(NoopStore)
  };

  Ok(SyncEngine::new(
    Arc::new(remote),
    cache,
    config.site.per_page,
  ))
}

fn init_tracing(log: &LogConfig) -> Result<WorkerGuard> {
  let filter = EnvFilter::try_from_env("WPFEED_LOG").or_else(|_| EnvFilter::try_new(&log.filter))?;

  let (writer, guard) = match &log.file {
    Some(path) => {
      let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
      let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("log.file has no file name: {}", path.display()))?;
      std::fs::create_dir_all(dir)
        .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;
      tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
    }
    None => tracing_appender::non_blocking(std::io::stderr()),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(log.file.is_none())
    .init();

  Ok(guard)
}
