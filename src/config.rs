//! Configuration management for novelmind.
//!
//! Settings come from a TOML file (explicit path, `./novelmind.toml`, or the
//! user config directory), then environment, then command-line overrides.
//! Every section is optional and falls back to built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::scrapers::{FetchConfig, SiteConfig};
use crate::services::RecommendationConfig;

/// Config file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "novelmind.toml";

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "novelmind.db";

/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "NOVELMIND_DATABASE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        // Falls back gracefully: data dir -> home dir -> current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("novelmind");
        Self {
            path: data_dir.join(DEFAULT_DATABASE_FILENAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub crawler: FetchConfig,
    pub site: SiteConfig,
    pub recommendation: RecommendationConfig,
    pub server: ServerConfig,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read settings from a file. Relative database paths are taken
    /// relative to the file's directory.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut settings = Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        if settings.database.path.is_relative() {
            if let Some(base_dir) = path.parent() {
                settings.database.path = base_dir.join(&settings.database.path);
            }
        }
        Ok(settings)
    }

    /// Reject settings the services cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.crawler
            .validate()
            .context("invalid crawler settings")?;
        self.recommendation
            .weights
            .validate()
            .context("invalid recommendation weights")?;
        if self.recommendation.max_limit == 0 {
            bail!("recommendation.max_limit must be at least 1");
        }
        if self.site.base_url.trim().is_empty() {
            bail!("site.base_url must not be empty");
        }
        Ok(())
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Database file (--database flag), highest precedence.
    pub database: Option<PathBuf>,
}

/// Config files tried when no explicit path is given, in order.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILENAME)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("novelmind").join("config.toml"));
    }
    candidates
}

/// Pick the database path: flag, then environment, then file/default.
fn resolve_database(configured: PathBuf, flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(path) = env.filter(|s| !s.trim().is_empty()) {
        tracing::debug!("Using {} from environment: {}", DATABASE_ENV, path);
        return PathBuf::from(path);
    }
    configured
}

/// Load and validate settings with explicit options.
pub fn load_settings_with_options(options: &LoadOptions) -> anyhow::Result<Settings> {
    let mut settings = match &options.config_path {
        Some(path) => Settings::from_file(path)?,
        None => match config_candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Settings::from_file(&path)?
            }
            None => Settings::default(),
        },
    };

    settings.database.path = resolve_database(
        settings.database.path,
        options.database.clone(),
        std::env::var(DATABASE_ENV).ok(),
    );

    settings.validate()?;
    Ok(settings)
}
