//! CLI command implementations
//!
//! Each command module implements a specific dynlist CLI command.

pub mod check;
pub mod list;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use dynlist_core::{ConfigRegistry, ListEngine, ListEngineBuilder, ListError, RegistrySnapshot};
use dynlist_core::request::parse_context;
use dynlist_types::ListContext;
use serde_json::Value;

use crate::config::Config;
use crate::error::CliError;

/// Builds an engine builder over every application in the config.
pub(crate) fn engine_builder(config: &Config) -> Result<(ListEngineBuilder, Arc<RegistrySnapshot>), CliError> {
    let snapshot = config.load_registry()?;
    let registry = Arc::new(ConfigRegistry::new(snapshot));
    let snapshot = registry.snapshot();
    let builder = ListEngine::builder(registry).config(config.engine_config());
    Ok((builder, snapshot))
}

/// The application a command runs against: `--app`, else the configured default.
pub(crate) fn resolve_app(app: Option<&str>, snapshot: &RegistrySnapshot) -> Result<String, CliError> {
    match app {
        Some(app) => Ok(app.to_owned()),
        None => snapshot
            .default_app()
            .map(|app| app.app_id.clone())
            .ok_or(CliError::NoApplication),
    }
}

/// Reads a `--context` argument: inline JSON, or `@path` to read it from a file.
pub fn read_context(arg: Option<&str>, default_limit: u32) -> Result<ListContext, CliError> {
    let text = match arg {
        None => return Ok(parse_context(None, default_limit).map_err(ListError::from)?),
        Some(arg) => match arg.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(Path::new(path))
                .map_err(|e| CliError::IoError(format!("{path}: {e}")))?,
            None => arg.to_owned(),
        },
    };
    Ok(parse_context(Some(Value::String(text)), default_limit).map_err(ListError::from)?)
}
