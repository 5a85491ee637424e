use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("consumer '{consumer}' is not subscribed to '{stream}'")]
    NotSubscribed { consumer: String, stream: String },

    #[error("{command} failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },
}
