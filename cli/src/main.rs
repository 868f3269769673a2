use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use dotenv::{dotenv, from_path};

use crate::{
    cli_interface::{Commands, CLI},
    commands::{
        apply::handle_apply_command, render::handle_render_command,
        template::handle_template_command,
    },
    console::print_error_message,
};

mod cli_interface;
mod commands;
mod console;

fn load_env_from_path(project_path: &Path) {
    if from_path(project_path.join(".env")).is_err() {
        dotenv().ok();
    }
}

fn resolve_path(override_path: &Option<String>) -> Result<PathBuf, String> {
    match override_path {
        Some(path) => {
            let path = PathBuf::from_str(path).map_err(|_| "Invalid path provided.".to_string())?;
            Ok(path)
        }
        None => {
            Ok(std::env::current_dir().map_err(|_| "Failed to get current directory.".to_string())?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CLI::parse();

    match &cli.command {
        Commands::Template { family, path } => {
            let resolved_path = resolve_path(path).map_err(|e| {
                print_error_message(&e);
                e
            })?;
            load_env_from_path(&resolved_path);
            handle_template_command(resolved_path, *family)
        }
        Commands::Render { batch, output } => {
            let resolved_path = resolve_path(&batch.path).map_err(|e| {
                print_error_message(&e);
                e
            })?;
            load_env_from_path(&resolved_path);
            handle_render_command(resolved_path, batch, output.as_deref())
        }
        Commands::Apply { batch } => {
            let resolved_path = resolve_path(&batch.path).map_err(|e| {
                print_error_message(&e);
                e
            })?;
            load_env_from_path(&resolved_path);
            handle_apply_command(resolved_path, batch).await
        }
    }
}
