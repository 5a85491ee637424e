use logsplit_core::clock::{MockClock, utc_day_start_millis};
use logsplit_core::conf::OptionMap;
use logsplit_core::dispatch::{BatchReport, DispatchSettings, Dispatcher, RegisterError};
use logsplit_core::event::EntryId;
use logsplit_core::source::MemoryLog;
use logsplit_core::store::MemoryStore;
use std::sync::Arc;

/// 2024-03-15T13:45:10.250Z
pub const START_MILLIS: u64 = 1_710_510_310_250;

/// A dispatcher wired to in-memory backends and a mock clock fixed at
/// [`START_MILLIS`]. Archive days are bucketed in UTC.
pub struct TestPipeline {
    pub clock: Arc<MockClock>,
    pub store: Arc<MemoryStore>,
    pub log: Arc<MemoryLog>,
    pub dispatcher: Dispatcher,
}

impl TestPipeline {
    pub fn new(settings: DispatchSettings) -> Self {
        let clock = Arc::new(MockClock::at_millis(START_MILLIS));
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let log = Arc::new(MemoryLog::new(clock.clone()));
        let dispatcher = Dispatcher::new(store.clone(), log.clone(), clock.clone(), settings)
            .with_day_start(utc_day_start_millis);

        Self {
            clock,
            store,
            log,
            dispatcher,
        }
    }

    pub fn registered(options: Option<&OptionMap>) -> Result<Self, RegisterError> {
        let mut pipeline = Self::new(DispatchSettings::default());
        pipeline.dispatcher.register(options)?;
        Ok(pipeline)
    }

    /// Another dispatcher on the same backends, registered with the same
    /// options as this one.
    pub fn sibling(&self, options: Option<&OptionMap>) -> Result<Dispatcher, RegisterError> {
        let mut dispatcher = Dispatcher::new(
            self.store.clone(),
            self.log.clone(),
            self.clock.clone(),
            self.dispatcher.settings().clone(),
        )
        .with_day_start(utc_day_start_millis);
        dispatcher.register(options)?;
        Ok(dispatcher)
    }

    /// Append a payload to the subscribed source stream.
    pub fn emit(&self, json: &str) -> EntryId {
        let stream = self
            .dispatcher
            .subscription()
            .map(|s| s.stream.clone())
            .unwrap_or_else(|| "test".to_string());
        self.log.append_json(&stream, json)
    }

    /// Poll until the source has nothing more to deliver.
    pub fn drain(&mut self) -> BatchReport {
        let mut total = BatchReport::default();
        loop {
            let report = self.dispatcher.poll().unwrap();
            if report.is_empty() {
                return total;
            }
            total.delivered += report.delivered;
            total.processed += report.processed;
            total.duplicates += report.duplicates;
            total.trimmed += report.trimmed;
            total.rejected += report.rejected;
            total.failed += report.failed;
        }
    }
}
