use crate::store::StoreError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A fan-out write was refused by the store.
#[derive(Debug, Error)]
#[error("{step} write failed: {source}")]
pub struct StorageWriteError {
    pub step: &'static str,
    #[source]
    pub source: StoreError,
}

impl StorageWriteError {
    pub fn new(step: &'static str, source: StoreError) -> Self {
        Self { step, source }
    }
}

/// Outcome of a fan-out that stopped part way.
#[derive(Debug)]
pub struct StepFailure {
    /// Steps whose writes completed before the failure, in order.
    pub committed: Vec<&'static str>,
    pub error: StorageWriteError,
}

impl StepFailure {
    pub fn step(&self) -> &'static str {
        self.error.step
    }
}

impl Display for StepFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.committed.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(
                f,
                "{} (already committed: {})",
                self.error,
                self.committed.join(", ")
            )
        }
    }
}

impl std::error::Error for StepFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
