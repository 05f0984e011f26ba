use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::api::QueryPolicies;
use crate::cache::{QueryOptions, RetryPolicy};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub cache: CacheConfig,
  pub table: TableConfig,
  pub session: SessionConfig,
  pub log: LogConfig,
  /// Custom title for the header (defaults to the API host)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://jsonplaceholder.typicode.com".to_string(),
    }
  }
}

/// Freshness and retention of one collection's cached queries
#[derive(Debug, Clone)]
pub struct ResourceCacheConfig {
  pub stale_time: Duration,
  pub gc_time: Duration,
}

/// A resource section as written in the file; absent keys keep that
/// resource's defaults
#[derive(Deserialize)]
struct ResourceCacheSection {
  #[serde(default, with = "humantime_serde")]
  stale_time: Option<Duration>,
  #[serde(default, with = "humantime_serde")]
  gc_time: Option<Duration>,
}

impl ResourceCacheSection {
  fn over(self, defaults: ResourceCacheConfig) -> ResourceCacheConfig {
    ResourceCacheConfig {
      stale_time: self.stale_time.unwrap_or(defaults.stale_time),
      gc_time: self.gc_time.unwrap_or(defaults.gc_time),
    }
  }
}

fn users_cache<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ResourceCacheConfig, D::Error> {
  let section = ResourceCacheSection::deserialize(deserializer)?;
  Ok(section.over(CacheConfig::default().users))
}

fn posts_cache<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ResourceCacheConfig, D::Error> {
  let section = ResourceCacheSection::deserialize(deserializer)?;
  Ok(section.over(CacheConfig::default().posts))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  #[serde(deserialize_with = "users_cache")]
  pub users: ResourceCacheConfig,
  #[serde(deserialize_with = "posts_cache")]
  pub posts: ResourceCacheConfig,
  /// Attempts after the first failed read
  pub retry: u32,
  #[serde(with = "humantime_serde")]
  pub retry_delay: Duration,
  #[serde(with = "humantime_serde")]
  pub max_retry_delay: Duration,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      users: ResourceCacheConfig {
        stale_time: Duration::from_secs(5 * 60),
        gc_time: Duration::from_secs(10 * 60),
      },
      posts: ResourceCacheConfig {
        stale_time: Duration::from_secs(2 * 60),
        gc_time: Duration::from_secs(10 * 60),
      },
      retry: 3,
      retry_delay: Duration::from_secs(1),
      max_retry_delay: Duration::from_secs(30),
    }
  }
}

impl CacheConfig {
  fn options(&self, resource: &ResourceCacheConfig) -> QueryOptions {
    QueryOptions::default()
      .with_stale_time(resource.stale_time)
      .with_gc_time(resource.gc_time)
      .with_retry(RetryPolicy {
        max_retries: self.retry,
        initial_delay: self.retry_delay,
        max_delay: self.max_retry_delay,
      })
  }

  pub fn policies(&self) -> QueryPolicies {
    QueryPolicies {
      users: self.options(&self.users),
      posts: self.options(&self.posts),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
  pub default_page_size: usize,
  pub page_size_options: Vec<usize>,
}

impl Default for TableConfig {
  fn default() -> Self {
    Self {
      default_page_size: 5,
      page_size_options: vec![5, 10, 20, 50],
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Session database (default: $XDG_DATA_HOME/d9s/session.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Filter directive, overridden by RUST_LOG
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./d9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/d9s/config.yaml
  ///
  /// Built-in defaults apply when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("d9s.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("d9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file is valid and means "all defaults"
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  pub fn validate(&self) -> Result<()> {
    self.base_url()?;

    let table = &self.table;
    if table.page_size_options.is_empty() {
      return Err(eyre!("table.page_size_options must not be empty"));
    }
    if table.default_page_size == 0 || table.page_size_options.contains(&0) {
      return Err(eyre!("page sizes must be greater than zero"));
    }
    if !table.page_size_options.contains(&table.default_page_size) {
      return Err(eyre!(
        "table.default_page_size {} is not one of {:?}",
        table.default_page_size,
        table.page_size_options
      ));
    }

    for (name, resource) in [("users", &self.cache.users), ("posts", &self.cache.posts)] {
      if resource.gc_time < resource.stale_time {
        return Err(eyre!(
          "cache.{}.gc_time must not be shorter than its stale_time",
          name
        ));
      }
    }

    Ok(())
  }

  pub fn base_url(&self) -> Result<Url> {
    Url::parse(&self.api.base_url)
      .map_err(|e| eyre!("Invalid api.base_url {:?}: {}", self.api.base_url, e))
  }

  /// Header title: the configured one, or the API host
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    self
      .base_url()
      .ok()
      .and_then(|u| u.host_str().map(String::from))
      .unwrap_or_else(|| self.api.base_url.clone())
  }

  /// Directory for the session database and the log file
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;
    Ok(data_dir.join("d9s"))
  }

  pub fn session_path(&self) -> Result<PathBuf> {
    match &self.session.path {
      Some(path) => Ok(path.clone()),
      None => Ok(Self::data_dir()?.join("session.db")),
    }
  }
}
