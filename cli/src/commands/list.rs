//! List command - executes a list request against the configured database

use dynlist_postgres::PgListPool;

use crate::commands::{engine_builder, read_context, resolve_app};
use crate::config::{CONFIG_FILE, Config};
use crate::error::CliError;

pub fn run(
    config: &Config,
    entity: &str,
    app: Option<&str>,
    context: Option<&str>,
) -> Result<(), CliError> {
    let (builder, snapshot) = engine_builder(config)?;
    let app = resolve_app(app, &snapshot)?;
    let url = config
        .database_url()
        .ok_or_else(|| CliError::NoDatabase(CONFIG_FILE.into()))?;
    let context = read_context(context, config.engine_config().default_limit)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::IoError(e.to_string()))?;

    let response = runtime.block_on(async {
        let pool = PgListPool::connect(&url, config.database.max_connections).await?;
        let engine = builder.build(pool);
        engine.execute(&app, entity, &context).await
    })?;

    let text =
        serde_json::to_string_pretty(&response).map_err(|e| CliError::Other(e.to_string()))?;
    println!("{text}");
    Ok(())
}
