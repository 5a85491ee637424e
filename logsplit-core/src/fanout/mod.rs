//! The per-event fan-out.
//!
//! Three steps each perform one write against the shared store:
//!
//! 1. [`SeverityRouter`] appends the payload to the capped stream of its
//!    severity.
//! 2. [`AggregateRecorder`] bumps the severity counter and mirrors the new
//!    value into the severity time series.
//! 3. [`ArchiveWriter`] stores the payload as a day-bucketed document.
//!
//! [`FanoutPipeline`] runs them in that order. There is no transaction
//! across steps: when one fails the later ones are skipped and the earlier
//! writes stay in place. The failure reports which steps had committed.

mod archive;
mod errors;
mod pipeline;
mod recorder;
mod router;

#[cfg(test)]
mod tests;

pub use archive::ArchiveWriter;
pub use errors::{StepFailure, StorageWriteError};
pub use pipeline::FanoutPipeline;
pub use recorder::AggregateRecorder;
pub use router::SeverityRouter;

use crate::event::Event;
use crate::store::LogStore;

/// One write of the fan-out.
pub trait FanoutStep: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, store: &dyn LogStore, event: &Event) -> Result<(), StorageWriteError>;
}
