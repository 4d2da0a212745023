//! Check command - validates configuration and application files

use dynlist_core::RegistrySnapshot;
use dynlist_core::metadata::entity_metadata;

use crate::config::Config;
use crate::error::CliError;
use crate::output;

pub fn run(config: &Config) -> Result<(), CliError> {
    println!("{}", output::heading("Checking configuration..."));
    println!();

    let mut warnings = Vec::new();
    let mut has_errors = false;

    let engine = config.engine_config();
    println!(
        "  {}: {}",
        output::label("Page size"),
        format_args!("{} (max {})", engine.default_limit, engine.max_limit)
    );
    if let Some(timeout) = engine.statement_timeout {
        println!(
            "  {}: {}ms",
            output::label("Statement timeout"),
            timeout.as_millis()
        );
    }

    // Application files
    println!();
    print!("  {} Applications... ", output::label("Checking"));
    match config.load_registry() {
        Ok(snapshot) => {
            println!("{}", output::status_ok());
            print_applications(&snapshot);
        }
        Err(e) => {
            println!("{}", output::status_error());
            println!("    {e}");
            has_errors = true;
        }
    }

    // Database
    println!();
    print!("  {} Database... ", output::label("Checking"));
    match config.database_url() {
        Some(url) => {
            println!("{}", output::status_ok());
            println!("    {}: {}", output::label("PostgreSQL"), mask_url(&url));
            println!(
                "    {}: {}",
                output::label("Max connections"),
                config.database.max_connections
            );
        }
        None => {
            println!("{}", output::status_warning("NOT SET"));
            warnings.push("No database URL (needed for list)");
        }
    }

    // Summary
    println!();
    if has_errors {
        println!("{}", output::error("Configuration has errors."));
        Err(CliError::Other("config check failed".into()))
    } else if warnings.is_empty() {
        println!("{}", output::success("Configuration OK."));
        Ok(())
    } else {
        println!(
            "{}",
            output::warning(&format!("{} warning(s):", warnings.len()))
        );
        for w in warnings {
            println!("  - {w}");
        }
        Ok(())
    }
}

fn print_applications(snapshot: &RegistrySnapshot) {
    let default = snapshot.default_app().map(|app| app.app_id.as_str());
    let mut apps: Vec<_> = snapshot.applications().collect();
    apps.sort_by(|a, b| a.app_id.cmp(&b.app_id));

    for app in apps {
        let marker = if Some(app.app_id.as_str()) == default {
            output::muted(" (default)")
        } else {
            String::new()
        };
        println!("    {}{marker}", output::label(&app.app_id));
        for entity in &app.entities {
            let meta = entity_metadata(entity);
            let sort = meta
                .default_sort
                .iter()
                .map(|sort| sort.field.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "      {} {} {}",
                entity.code,
                output::muted(&format!("-> {}.\"{}\"", meta.schema, meta.base_table)),
                output::muted(&format!(
                    "{} fields, sorted by {}",
                    meta.visible_fields().count(),
                    if sort.is_empty() { "-" } else { sort.as_str() }
                )),
            );
        }
    }
}

fn mask_url(url: &str) -> String {
    if let Some(at) = url.find('@')
        && let Some(colon) = url[..at].rfind(':')
    {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if colon > scheme_end {
            return format!("{}****{}", &url[..colon + 1], &url[at..]);
        }
    }
    url.to_string()
}
