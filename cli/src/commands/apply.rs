use std::path::PathBuf;

use ribsink::{write_prefix_batch, PostgresClient};

use crate::{
    cli_interface::BatchArgs,
    commands::{batch_options, load_config, read_batch},
    console::{print_error_message, print_success_message, print_warn_message},
};

pub async fn handle_apply_command(
    project_path: PathBuf,
    args: &BatchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&project_path)?;
    let batch = read_batch(args)?;

    if batch.is_empty() {
        print_warn_message("No records in the input. Nothing to apply.");
        return Ok(());
    }

    let client = PostgresClient::new().await.map_err(|e| {
        print_error_message(&format!("Could not connect to Postgres, make sure your connection string is mapping in the .env correctly: trace: {}", e));
        e
    })?;

    let summary = write_prefix_batch(&client, &config.tables, &batch, &batch_options(&config, args))
        .await
        .map_err(|e| {
            print_error_message(&format!("Could not write the batch to Postgres: trace: {}", e));
            e
        })?;

    if !summary.diagnostics.is_empty() {
        print_warn_message(&format!(
            "{} prefix bit values could not be derived and were written as placeholders",
            summary.diagnostics.len()
        ));
    }

    print_success_message(&format!(
        "Applied {} {} records in {} statements",
        summary.rows,
        batch.family(),
        summary.statements
    ));

    Ok(())
}
