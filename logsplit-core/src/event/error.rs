use thiserror::Error;

/// A delivered entry could not be turned into an event.
///
/// Decode failures are per-entry: the dispatcher logs them, acknowledges the
/// entry and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed entry id '{0}'")]
    MalformedId(String),

    #[error("entry has no '{0}' field")]
    MissingField(&'static str),

    #[error("payload is not a JSON object: {0}")]
    MalformedPayload(String),

    #[error("payload has no string 'log_level'")]
    MissingSeverity,

    #[error("entry was trimmed from the source log")]
    Trimmed,
}
