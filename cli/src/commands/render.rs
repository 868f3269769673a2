use std::{fs, path::PathBuf};

use ribsink::{manifest::config::TableTargets, AssembleError, BatchOptions, PrefixBatch};

use crate::{
    cli_interface::BatchArgs,
    commands::{batch_options, load_config, read_batch},
    console::{print_error_message, print_success_message, print_warn_message},
};

pub fn render_statements(
    batch: &PrefixBatch,
    tables: &TableTargets,
    options: &BatchOptions,
) -> Result<String, AssembleError> {
    let mut sql = String::new();
    for built in batch.statements(tables, options)? {
        for diagnostic in &built.diagnostics {
            print_warn_message(&diagnostic.to_string());
        }
        sql.push_str(&built.statement.to_sql());
        sql.push_str(";\n");
    }
    Ok(sql)
}

pub fn handle_render_command(
    project_path: PathBuf,
    args: &BatchArgs,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&project_path)?;
    let batch = read_batch(args)?;

    if batch.is_empty() {
        print_warn_message("No records in the input. Nothing to render.");
        return Ok(());
    }

    let sql = render_statements(&batch, &config.tables, &batch_options(&config, args))
        .map_err(|e| {
            print_error_message(&format!("Could not build statements: trace: {}", e));
            e
        })?;

    match output {
        Some(output) => {
            fs::write(output, sql).map_err(|e| {
                print_error_message(&format!("Could not write {}: trace: {}", output, e));
                e
            })?;
            print_success_message(&format!("Wrote {} records to {}", batch.len(), output));
        }
        None => print!("{}", sql),
    }

    Ok(())
}
