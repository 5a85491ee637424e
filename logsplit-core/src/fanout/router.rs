use crate::event::{Event, PAYLOAD_FIELD};
use crate::fanout::{FanoutStep, StorageWriteError};
use crate::store::{LogStore, keys};

/// Appends each event to the capped stream named after its severity.
///
/// Streams are created on first use, so an unseen severity simply gets a new
/// stream. Trimming is approximate and left to the store.
pub struct SeverityRouter {
    max_len: u64,
}

impl SeverityRouter {
    pub const NAME: &'static str = "severity_router";

    pub fn new(max_len: u64) -> Self {
        Self { max_len }
    }

    pub fn route(&self, store: &dyn LogStore, event: &Event) -> Result<(), StorageWriteError> {
        let stream = keys::severity_stream(&event.severity);

        store
            .append_capped(&stream, self.max_len, PAYLOAD_FIELD, &event.json)
            .map_err(|e| StorageWriteError::new(Self::NAME, e))?;

        Ok(())
    }
}

impl FanoutStep for SeverityRouter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, store: &dyn LogStore, event: &Event) -> Result<(), StorageWriteError> {
        self.route(store, event)
    }
}
