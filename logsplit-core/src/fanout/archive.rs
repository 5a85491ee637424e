use crate::clock::{Clock, local_day_start_millis};
use crate::event::{EntryId, Event};
use crate::fanout::{FanoutStep, StorageWriteError};
use crate::store::{LogStore, keys};
use std::sync::Arc;

/// Stores every payload as a document keyed by processing day and entry id.
///
/// The day is the local calendar day at processing time, not the event's own
/// timestamp. Replaying an entry on the same day overwrites its document;
/// replaying it on a later day writes a second one.
pub struct ArchiveWriter {
    prefix: String,
    clock: Arc<dyn Clock>,
    day_start: fn(std::time::SystemTime) -> i64,
}

impl ArchiveWriter {
    pub const NAME: &'static str = "archive_writer";

    pub fn new(prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            prefix: prefix.into(),
            clock,
            day_start: local_day_start_millis,
        }
    }

    /// Bucket days with a custom boundary instead of local midnight.
    pub fn with_day_start(mut self, day_start: fn(std::time::SystemTime) -> i64) -> Self {
        self.day_start = day_start;
        self
    }

    pub fn key_for(&self, id: &EntryId) -> String {
        let day = (self.day_start)(self.clock.now());
        keys::archive_key(&self.prefix, day, id)
    }

    pub fn archive(
        &self,
        store: &dyn LogStore,
        id: &EntryId,
        json: &str,
    ) -> Result<String, StorageWriteError> {
        let key = self.key_for(id);

        store
            .set_document(&key, json)
            .map_err(|e| StorageWriteError::new(Self::NAME, e))?;

        Ok(key)
    }
}

impl FanoutStep for ArchiveWriter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, store: &dyn LogStore, event: &Event) -> Result<(), StorageWriteError> {
        self.archive(store, &event.id, &event.json).map(|_| ())
    }
}
