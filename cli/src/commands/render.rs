//! Render command - prints the statement a list request would run

use crate::commands::{engine_builder, read_context, resolve_app};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

pub fn run(
    config: &Config,
    entity: &str,
    app: Option<&str>,
    context: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let (builder, snapshot) = engine_builder(config)?;
    let planner = builder.build_planner();
    let app = resolve_app(app, &snapshot)?;
    let context = read_context(context, planner.config().default_limit)?;

    let plan = planner.plan(&app, entity, &context)?;

    if json {
        let text = serde_json::to_string_pretty(&plan.query)
            .map_err(|e| CliError::Other(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    println!("{}", output::heading("SQL"));
    println!("  {}", plan.query.text);
    println!();
    println!("{}", output::heading("Params"));
    if plan.query.params.is_empty() {
        println!("  {}", output::muted("(none)"));
    }
    for (index, param) in plan.query.params.iter().enumerate() {
        println!("  {} = {}", output::label(&format!("${}", index + 1)), param.to_json());
    }
    println!();
    println!(
        "{} {} {}",
        output::label("List:"),
        plan.list_code,
        output::muted(if plan.custom_query_applied {
            "(custom query)"
        } else {
            "(generated)"
        })
    );
    Ok(())
}
