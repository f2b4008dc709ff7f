use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::mirror::{SqliteStorage, DEFAULT_SLOT};

/// Environment variable that overrides `remote.url`
pub const REMOTE_URL_ENV: &str = "SHELF_REMOTE_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub remote: RemoteConfig,
  #[serde(default)]
  pub mirror: MirrorConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  /// Base URL of the inventory service; `/products` is appended
  #[serde(default = "default_remote_url")]
  pub url: String,
  /// Request timeout. No timeout when unset.
  pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      url: default_remote_url(),
      timeout_secs: None,
    }
  }
}

fn default_remote_url() -> String {
  "http://localhost:8083".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
  /// Mirror database file (defaults to $XDG_DATA_HOME/shelf/mirror.db)
  pub path: Option<PathBuf>,
  #[serde(default = "default_slot")]
  pub slot: String,
}

impl Default for MirrorConfig {
  fn default() -> Self {
    Self {
      path: None,
      slot: default_slot(),
    }
  }
}

fn default_slot() -> String {
  DEFAULT_SLOT.to_string()
}

impl MirrorConfig {
  pub fn resolved_path(&self) -> Result<PathBuf> {
    match &self.path {
      Some(p) => Ok(p.clone()),
      None => SqliteStorage::default_path(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Filter used when RUST_LOG is not set
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Write daily log files here instead of stderr
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      dir: None,
    }
  }
}

fn default_log_level() -> String {
  "warn".to_string()
}

impl Config {
  /// Load configuration from file, falling back to defaults.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./shelf.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/shelf/config.yaml
  ///
  /// `SHELF_REMOTE_URL` overrides the configured service URL.
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

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    config
      .with_remote_url(std::env::var(REMOTE_URL_ENV).ok())
      .validated()
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("shelf.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("shelf").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file deserializes to null rather than an empty mapping.
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  fn with_remote_url(mut self, url: Option<String>) -> Self {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
      self.remote.url = url;
    }
    self
  }

  fn validated(self) -> Result<Self> {
    let url = Url::parse(&self.remote.url)
      .map_err(|e| eyre!("Invalid remote URL '{}': {}", self.remote.url, e))?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(eyre!("Remote URL must be http or https: {}", self.remote.url));
    }
    if self.mirror.slot.is_empty() {
      return Err(eyre!("Mirror slot name must not be empty"));
    }
    Ok(self)
  }
}
