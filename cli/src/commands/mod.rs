use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use ribsink::{
    log_level_from_str,
    manifest::{config::Config, yaml::read_config_or_default},
    setup_logger, BatchOptions, PrefixBatch,
};

use crate::{cli_interface::BatchArgs, console::print_error_message};

pub mod apply;
pub mod render;
pub mod template;

pub fn load_config(project_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = read_config_or_default(project_path).map_err(|e| {
        print_error_message(&format!("Could not read ribsink.yaml: trace: {}", e));
        e
    })?;

    setup_logger(log_level_from_str(config.log_level.as_deref().unwrap_or("info")));

    Ok(config)
}

pub fn batch_options(config: &Config, args: &BatchArgs) -> BatchOptions {
    let mut options = config.batch_options();
    if let Some(max_rows) = args.max_rows.filter(|rows| *rows > 0) {
        options.max_rows = Some(max_rows);
    }
    options
}

/// Reads the records named by `args`, from the input file or stdin.
pub fn read_batch(args: &BatchArgs) -> Result<PrefixBatch, Box<dyn std::error::Error>> {
    let json = match &args.input {
        Some(input) => fs::read_to_string(PathBuf::from(input)).map_err(|e| {
            print_error_message(&format!("Could not read {}: trace: {}", input, e));
            e
        })?,
        None => {
            let mut json = String::new();
            io::stdin().read_to_string(&mut json)?;
            json
        }
    };

    let batch = PrefixBatch::from_json(args.family, &json).map_err(|e| {
        print_error_message(&format!(
            "Input is not a JSON array of {} records: trace: {}",
            args.family, e
        ));
        e
    })?;

    Ok(batch)
}
