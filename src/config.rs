use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub const DEFAULT_PER_PAGE: u32 = 10;

/// WordPress rejects larger `per_page` values with a 400.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub site: SiteConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
  /// Base URL of the WordPress site (the REST path is appended)
  pub url: String,
  /// Posts requested per page
  #[serde(default = "default_per_page")]
  pub per_page: u32,
  /// Request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Disable to run without a local cache (no offline fallback)
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Database file (defaults to a per-site file in the data directory)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Write logs to this file instead of stderr
  pub file: Option<PathBuf>,
  /// `tracing` filter directive; WPFEED_LOG takes precedence
  #[serde(default = "default_log_filter")]
  pub filter: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      filter: default_log_filter(),
    }
  }
}

fn default_per_page() -> u32 {
  DEFAULT_PER_PAGE
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_true() -> bool {
  true
}

fn default_log_filter() -> String {
  "wpfeed=info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./wpfeed.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/wpfeed/config.yaml
  ///
  /// When no file is found, `url_override` alone is enough to build a
  /// default configuration. If both are present the override wins.
  pub fn load(explicit_path: Option<&Path>, url_override: Option<&str>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match (path, url_override) {
      (Some(p), _) => Self::load_from_path(&p)?,
      (None, Some(url)) => Self::for_url(url),
      (None, None) => {
        return Err(eyre!(
          "No configuration file found. Create one at ~/.config/wpfeed/config.yaml\n\
                 or pass the site with --url."
        ))
      }
    };

    if let Some(url) = url_override {
      config.site.url = url.to_string();
    }

    config.validate()?;
    Ok(config)
  }

  /// Defaults for a site given only by URL.
  pub fn for_url(url: &str) -> Self {
    Self {
      site: SiteConfig {
        url: url.to_string(),
        per_page: DEFAULT_PER_PAGE,
        timeout_secs: default_timeout_secs(),
        user_agent: None,
      },
      cache: CacheConfig::default(),
      log: LogConfig::default(),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("wpfeed.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("wpfeed").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    if self.site.url.trim().is_empty() {
      return Err(eyre!("site.url must not be empty"));
    }
    if self.site.per_page == 0 || self.site.per_page > MAX_PER_PAGE {
      return Err(eyre!(
        "site.per_page must be between 1 and {}, got {}",
        MAX_PER_PAGE,
        self.site.per_page
      ));
    }
    if self.site.timeout_secs == 0 {
      return Err(eyre!("site.timeout_secs must be at least 1"));
    }
    Ok(())
  }

  /// Where the post cache lives for this site.
  ///
  /// Each site URL gets its own database file so switching sites never mixes
  /// posts with colliding ids.
  pub fn cache_path(&self) -> Result<PathBuf> {
    if let Some(path) = &self.cache.path {
      return Ok(path.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(
      data_dir
        .join("wpfeed")
        .join(format!("cache-{}.db", site_key(&self.site.url))),
    )
  }
}

/// Stable short key for a site URL.
fn site_key(url: &str) -> String {
  let normalized = url.trim().trim_end_matches('/').to_lowercase();
  let mut hasher = Sha256::new();
  hasher.update(normalized.as_bytes());
  let digest = hex::encode(hasher.finalize());
  digest[..16].to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let file = write_config("site:\n  url: https://blog.example.com\n");
    let config = Config::load(Some(file.path()), None).unwrap();

    assert_eq!(config.site.url, "https://blog.example.com");
    assert_eq!(config.site.per_page, 10);
    assert_eq!(config.site.timeout_secs, 30);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.path, None);
    assert_eq!(config.log.filter, "wpfeed=info");
  }

  #[test]
  fn test_full_config() {
    let file = write_config(
      "site:\n  url: https://a.example\n  per_page: 25\n  timeout_secs: 5\n  user_agent: test/1\n\
       cache:\n  enabled: false\n  path: /tmp/x.db\n\
       log:\n  file: /tmp/wpfeed.log\n  filter: debug\n",
    );
    let config = Config::load(Some(file.path()), None).unwrap();

    assert_eq!(config.site.per_page, 25);
    assert_eq!(config.site.user_agent.as_deref(), Some("test/1"));
    assert!(!config.cache.enabled);
    assert_eq!(config.cache_path().unwrap(), PathBuf::from("/tmp/x.db"));
    assert_eq!(config.log.file, Some(PathBuf::from("/tmp/wpfeed.log")));
    assert_eq!(config.log.filter, "debug");
  }

  #[test]
  fn test_url_override_wins() {
    let file = write_config("site:\n  url: https://a.example\n  per_page: 5\n");
    let config = Config::load(Some(file.path()), Some("https://b.example")).unwrap();
    assert_eq!(config.site.url, "https://b.example");
    assert_eq!(config.site.per_page, 5);
  }

  #[test]
  fn test_missing_explicit_file_is_error() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml")), None).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_zero_per_page_rejected() {
    let file = write_config("site:\n  url: https://a.example\n  per_page: 0\n");
    assert!(Config::load(Some(file.path()), None).is_err());
  }

  #[test]
  fn test_per_page_capped_at_wordpress_limit() {
    let file = write_config("site:\n  url: https://a.example\n  per_page: 100\n");
    assert_eq!(Config::load(Some(file.path()), None).unwrap().site.per_page, 100);

    let file = write_config("site:\n  url: https://a.example\n  per_page: 101\n");
    let err = Config::load(Some(file.path()), None).unwrap_err();
    assert!(err.to_string().contains("per_page"));
  }

  #[test]
  fn test_zero_timeout_rejected() {
    let file = write_config("site:\n  url: https://a.example\n  timeout_secs: 0\n");
    let err = Config::load(Some(file.path()), None).unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
  }

  #[test]
  fn test_site_key_ignores_trailing_slash_and_case() {
    assert_eq!(
      site_key("https://Blog.example.com/"),
      site_key("https://blog.example.com")
    );
    assert_ne!(site_key("https://a.example"), site_key("https://b.example"));
    assert_eq!(site_key("https://a.example").len(), 16);
  }
}
