use crate::conf::ConfigError;
use crate::source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid trigger options: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to subscribe: {0}")]
    Subscribe(#[from] SourceError),

    #[error("dispatcher has failed and cannot register again")]
    Failed,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher is not registered")]
    NotRegistered,

    #[error("dispatcher has failed")]
    Failed,

    #[error(transparent)]
    Source(#[from] SourceError),
}
