//! Error types for the CLI

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// List request failed
    #[error("{0}")]
    List(#[from] dynlist_core::ListError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// `list` needs a database and none is configured
    #[error("No database URL: set [database] url in {0} or DATABASE_URL")]
    NoDatabase(String),

    /// No application named and none configured as default
    #[error("No application given and no default application configured")]
    NoApplication,

    /// Other errors
    #[error("{0}")]
    Other(String),
}
