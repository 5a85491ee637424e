use crate::event::{Event, Severity};
use crate::fanout::{FanoutStep, StorageWriteError};
use crate::store::{LogStore, keys};

/// Keeps a running count per severity and a time series mirroring it.
///
/// The increment and the sample are two separate writes. If the process
/// dies between them the counter is ahead of the series by one.
pub struct AggregateRecorder;

impl AggregateRecorder {
    pub const NAME: &'static str = "aggregate_recorder";

    /// Returns the post-increment counter value that was sampled.
    pub fn record(
        &self,
        store: &dyn LogStore,
        severity: &Severity,
    ) -> Result<i64, StorageWriteError> {
        let err = |e| StorageWriteError::new(Self::NAME, e);

        let count = store
            .increment_counter(keys::COUNTER_KEY, severity.as_str(), 1)
            .map_err(err)?;

        store
            .add_sample(
                &keys::series_key(severity),
                count,
                &[("log_level", severity.as_str()), ("type", keys::SERIES_TYPE)],
            )
            .map_err(err)?;

        Ok(count)
    }
}

impl FanoutStep for AggregateRecorder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, store: &dyn LogStore, event: &Event) -> Result<(), StorageWriteError> {
        self.record(store, &event.severity).map(|_| ())
    }
}
