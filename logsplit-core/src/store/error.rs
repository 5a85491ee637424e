use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{command} failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },

    #[error("corrupt value at '{key}': {message}")]
    Corrupt { key: String, message: String },
}

impl StoreError {
    pub fn command(command: &'static str, message: impl Into<String>) -> Self {
        Self::Command {
            command,
            message: message.into(),
        }
    }
}
