use std::{
    env,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use regex::{Captures, Regex};
use tracing::error;

use crate::manifest::config::Config;

pub const YAML_CONFIG_NAME: &str = "ribsink.yaml";

#[derive(thiserror::Error, Debug)]
pub enum ReadConfigError {
    #[error("Could not open file: {0}")]
    CouldNotOpenFile(#[from] std::io::Error),

    #[error("Could not parse config: {0}")]
    CouldNotParseConfig(#[from] serde_yaml::Error),

    #[error("Environment variable {0} not found")]
    EnvironmentVariableNotFound(String),

    #[error("Could not build the environment variable pattern: {0}")]
    InvalidEnvPattern(#[from] regex::Error),
}

/// Replaces every `${VAR}` with the value of `VAR`.
fn substitute_env_variables(contents: &str) -> Result<String, ReadConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}")?;
    let mut missing: Option<String> = None;

    let result = re.replace_all(contents, |caps: &Captures| {
        let var_name = &caps[1];
        match env::var(var_name) {
            Ok(val) => val,
            Err(_) => {
                error!("Environment variable {} not found", var_name);
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var_name) => Err(ReadConfigError::EnvironmentVariableNotFound(var_name)),
        None => Ok(result.into_owned()),
    }
}

pub fn parse_config(contents: &str) -> Result<Config, ReadConfigError> {
    let substituted = substitute_env_variables(contents)?;
    let config: Config = serde_yaml::from_str(&substituted)?;
    Ok(config)
}

pub fn read_config(file_path: &Path) -> Result<Config, ReadConfigError> {
    let mut file = File::open(file_path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    parse_config(&contents)
}

/// Reads `ribsink.yaml` from `project_path` when present, otherwise the defaults.
pub fn read_config_or_default(project_path: &Path) -> Result<Config, ReadConfigError> {
    let path: PathBuf = project_path.join(YAML_CONFIG_NAME);
    if path.exists() {
        read_config(&path)
    } else {
        Ok(Config::default())
    }
}
