use crate::conf::OptionType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    // IO
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parsing
    #[error("failed to parse TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // Trigger options
    #[error("option '{name}' must be a {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: OptionType,
        found: &'static str,
    },

    // Settings
    #[error("invalid setting '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }

    /// The offending option name when this is a type mismatch.
    pub fn option_name(&self) -> Option<&str> {
        match self {
            Self::TypeMismatch { name, .. } => Some(name),
            _ => None,
        }
    }
}
