//! Configuration loader and validator for the Reddit→Notion sync job.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub notion: Notion,
    pub reddit: Reddit,
    pub sync: SyncSettings,
}

/// Notion API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Notion {
    pub token: String,
    pub version: String,
    pub database_id: Option<String>,
}

impl Default for Notion {
    fn default() -> Self {
        Self {
            token: String::new(),
            version: "2022-06-28".into(),
            database_id: None,
        }
    }
}

/// Reddit OAuth credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Reddit {
    pub user_agent: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Default for Reddit {
    fn default() -> Self {
        Self {
            user_agent: "notion-reddit-sync".into(),
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
        }
    }
}

/// Reconciliation knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncSettings {
    pub update_existing: bool,
    pub page_size: u32,
    pub max_pages: Option<usize>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            update_existing: true,
            page_size: 25,
            max_pages: None,
        }
    }
}

impl Config {
    /// Override file values with non-empty values returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("NOTION_KEY") {
            self.notion.token = v;
        }
        if let Some(v) = get("NOTION_VERSION") {
            self.notion.version = v;
        }
        if let Some(v) = get("NOTION_DATABASE_ID") {
            self.notion.database_id = Some(v);
        }
        if let Some(v) = get("REDDIT_CLIENT_ID") {
            self.reddit.client_id = v;
        }
        if let Some(v) = get("REDDIT_CLIENT_SECRET") {
            self.reddit.client_secret = v;
        }
        if let Some(v) = get("REDDIT_REFRESH_TOKEN") {
            self.reddit.refresh_token = v;
        }
        if let Some(v) = get("REDDIT_USER_AGENT") {
            self.reddit.user_agent = v;
        }
    }

    /// The configured database id, if any non-blank one was supplied.
    pub fn database_id(&self) -> Option<&str> {
        self.notion
            .database_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Load configuration from YAML (when available), apply environment
/// overrides and validate.
/// - If `path` is None, `config.yaml` in the current working directory is
///   read when it exists; otherwise defaults are used.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load`] with an injectable environment lookup.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match path {
        Some(p) => parse(&fs::read_to_string(p)?)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                parse(&fs::read_to_string(default_path)?)?
            } else {
                Config::default()
            }
        }
    };
    cfg.apply_env(lookup);
    validate(&cfg)?;
    Ok(cfg)
}

fn parse(content: &str) -> Result<Config, ConfigError> {
    // An empty file deserializes to null; treat it as all defaults.
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Validate a configuration instance. The database id is checked later by
/// the syncer so that its absence is reported before any remote call.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.notion.token.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.token must be non-empty (NOTION_KEY)"));
    }
    if cfg.notion.version.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.version must be non-empty"));
    }

    if cfg.reddit.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid("reddit.user_agent must be non-empty"));
    }
    if cfg.reddit.client_id.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "reddit.client_id must be non-empty (REDDIT_CLIENT_ID)",
        ));
    }
    if cfg.reddit.client_secret.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "reddit.client_secret must be non-empty (REDDIT_CLIENT_SECRET)",
        ));
    }
    if cfg.reddit.refresh_token.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "reddit.refresh_token must be non-empty (REDDIT_REFRESH_TOKEN)",
        ));
    }

    if cfg.sync.page_size == 0 || cfg.sync.page_size > 100 {
        return Err(ConfigError::Invalid("sync.page_size must be within 1..=100"));
    }
    if cfg.sync.max_pages == Some(0) {
        return Err(ConfigError::Invalid("sync.max_pages must be > 0 when set"));
    }

    Ok(())
}

/// Example YAML configuration.
pub fn example() -> &'static str {
    r#"notion:
  token: "YOUR_NOTION_INTEGRATION_TOKEN"
  version: "2022-06-28"
  database_id: "NOTION_DATABASE_ID"

reddit:
  user_agent: "notion-reddit-sync"
  client_id: "REDDIT_CLIENT_ID"
  client_secret: "REDDIT_CLIENT_SECRET"
  refresh_token: "REDDIT_REFRESH_TOKEN"

sync:
  update_existing: true
  page_size: 25
"#
}
