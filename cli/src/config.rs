//! Configuration for the dynlist CLI
//!
//! Handles loading `dynlist.toml` and the application definitions it points at.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dynlist_core::{EngineConfig, RegistrySnapshot};
use dynlist_types::{ApplicationConfig, MAX_PAGE_LIMIT};

pub const CONFIG_FILE: &str = "dynlist.toml";

/// Environment variables consulted, in order, when `[database] url` is not set.
pub const DATABASE_URL_VARS: [&str; 2] = ["DATABASE_URL", "APP_DATABASE_URL"];

// ============================================================================
// Config
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Application definition files, relative to the config file.
    #[serde(default)]
    pub applications: Vec<PathBuf>,

    /// Application used when a command does not name one.
    #[serde(default)]
    pub default_app: Option<String>,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub engine: EngineSection,

    /// Directory of the config file; application paths resolve against it.
    #[serde(skip)]
    root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 { 5 }

/// `[engine]` overrides of [`EngineConfig`] defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSection {
    #[serde(default)]
    pub max_limit: Option<u32>,

    #[serde(default)]
    pub default_limit: Option<u32>,

    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,

    #[serde(default)]
    pub log_statement_max_len: Option<usize>,
}

// ============================================================================
// Config implementation
// ============================================================================

impl Config {
    /// Load from default config file
    pub fn load() -> Result<Self, Error> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from specific path
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.into())
            } else {
                Error::Io(path.into(), e)
            }
        })?;

        let mut config = Self::from_toml_str(&content).map_err(|e| match e {
            Error::Parse(_, e) => Error::Parse(path.into(), e),
            other => other,
        })?;
        config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parses and validates config text; application paths resolve against the working directory.
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Parse(PathBuf::from(CONFIG_FILE), e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        let err = |msg: String| Error::Invalid(msg);

        if self.applications.is_empty() {
            return Err(err("at least one application file is required".into()));
        }
        if self.database.max_connections == 0 {
            return Err(err("database.maxConnections must be at least 1".into()));
        }

        let max_limit = self.engine.max_limit.unwrap_or(MAX_PAGE_LIMIT);
        if max_limit == 0 {
            return Err(err("engine.maxLimit must be at least 1".into()));
        }
        if let Some(default_limit) = self.engine.default_limit
            && !(1..=max_limit).contains(&default_limit)
        {
            return Err(err(format!(
                "engine.defaultLimit must be between 1 and {max_limit}"
            )));
        }
        Ok(())
    }

    /// Application file paths, resolved against the config file's directory.
    pub fn application_paths(&self) -> Vec<PathBuf> {
        self.applications
            .iter()
            .map(|path| self.root.join(path))
            .collect()
    }

    /// Reads every application file.
    pub fn load_applications(&self) -> Result<Vec<ApplicationConfig>, Error> {
        self.application_paths()
            .iter()
            .map(|path| ApplicationConfig::load_from(path).map_err(Error::from))
            .collect()
    }

    /// Reads every application file into a registry snapshot.
    pub fn load_registry(&self) -> Result<RegistrySnapshot, Error> {
        let snapshot = RegistrySnapshot::from_applications(self.load_applications()?)?;
        match &self.default_app {
            Some(app) => Ok(snapshot.with_default(app)?),
            None => Ok(snapshot),
        }
    }

    /// Connection URL from the config file, else from the environment.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            DATABASE_URL_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok().filter(|url| !url.is_empty()))
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(max_limit) = self.engine.max_limit {
            config = config.with_max_limit(max_limit);
        }
        if let Some(default_limit) = self.engine.default_limit {
            config = config.with_default_limit(default_limit);
        }
        if let Some(ms) = self.engine.statement_timeout_ms {
            config = config.with_statement_timeout(Duration::from_millis(ms));
        }
        if let Some(len) = self.engine.log_statement_max_len {
            config = config.with_log_statement_max_len(len);
        }
        config
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Application(#[from] dynlist_types::ConfigError),
}

pub type ConfigError = Error;

// ============================================================================
// Tests
// ============================================================================
