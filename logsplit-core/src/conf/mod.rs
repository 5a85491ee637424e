mod error;
mod loader;
mod options;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ConfigError;
pub use loader::{DEFAULT_CONFIG_PATH, load_config, load_config_or_default, parse_config};
pub use options::{OptionMap, OptionType, TriggerOptions, resolve, resolve_string};
pub use types::{RuntimeConfig, ServerConfig, TriggerConfig};
