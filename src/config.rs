use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use crate::error::{AppError, AppResult};

pub const DEFAULT_GROUP: &str = "default";

const GROUP_URL_PREFIX: &str = "DATABASE_URL_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database groups keyed by name. `default` is the group DAOs use unless
/// told otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub groups: BTreeMap<String, GroupConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl GroupConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_vars(env::vars())?)
    }

    /// Build and validate a config from `(key, value)` pairs shaped like the
    /// process environment.
    pub fn from_vars<I>(vars: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: BTreeMap<String, String> = vars.into_iter().collect();

        let max_connections = vars
            .get("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_connections);
        let acquire_timeout_secs = vars
            .get("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_acquire_timeout_secs);

        let group = |url: &str| GroupConfig {
            url: url.to_string(),
            max_connections,
            acquire_timeout_secs,
        };

        let mut groups = BTreeMap::new();
        groups.insert(
            DEFAULT_GROUP.to_string(),
            group(
                vars.get("DATABASE_URL")
                    .map(String::as_str)
                    .unwrap_or("sqlite:data/comment.db"),
            ),
        );
        for (key, url) in &vars {
            if let Some(name) = key.strip_prefix(GROUP_URL_PREFIX) {
                if !name.is_empty() {
                    groups.insert(name.to_lowercase(), group(url));
                }
            }
        }

        let config = Self {
            database: DatabaseConfig { groups },
            logging: LoggingConfig {
                level: vars
                    .get("LOG_LEVEL")
                    .cloned()
                    .unwrap_or_else(|| LoggingConfig::default().level),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigurationError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigurationError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database.groups.is_empty() {
            return Err(AppError::ConfigurationError(
                "at least one database group must be configured".to_string(),
            ));
        }
        for (name, group) in &self.database.groups {
            if group.url.trim().is_empty() {
                return Err(AppError::ConfigurationError(format!(
                    "database group '{}' has an empty url",
                    name
                )));
            }
            if group.max_connections == 0 {
                return Err(AppError::ConfigurationError(format!(
                    "database group '{}' must allow at least one connection",
                    name
                )));
            }
        }
        Ok(())
    }
}
