use crate::conf::{ConfigError, RuntimeConfig};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/logsplit.toml";

pub fn load_config(path: &Path) -> Result<RuntimeConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    parse_config(path, &contents)
}

pub fn parse_config(path: &Path, contents: &str) -> Result<RuntimeConfig, ConfigError> {
    let cfg: RuntimeConfig =
        toml::from_str(contents).map_err(|e| ConfigError::parse(path, e))?;

    cfg.validate()?;
    Ok(cfg)
}

/// Load an explicitly given config file, or the default one if it exists.
///
/// Falls back to built-in defaults only when no path was given and the
/// default file is absent.
pub fn load_config_or_default(path: Option<&Path>) -> Result<RuntimeConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config(default)
            } else {
                tracing::debug!(path = DEFAULT_CONFIG_PATH, "no config file; using defaults");
                Ok(RuntimeConfig::default())
            }
        }
    }
}
