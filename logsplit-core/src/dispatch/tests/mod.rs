mod dispatcher_tests;

use crate::clock::{MockClock, utc_day_start_millis};
use crate::dispatch::{DispatchSettings, Dispatcher};
use crate::source::MemoryLog;
use crate::store::MemoryStore;
use std::sync::Arc;

// 2024-03-15T13:45:10.250Z
pub(super) const NOW: u64 = 1_710_510_310_250;
// 2024-03-15T00:00:00Z
pub(super) const MIDNIGHT: i64 = 1_710_460_800_000;
pub(super) const DAY_MS: u64 = 86_400_000;

pub(super) struct Fixture {
    pub clock: Arc<MockClock>,
    pub store: Arc<MemoryStore>,
    pub log: Arc<MemoryLog>,
    pub dispatcher: Dispatcher,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_settings(DispatchSettings::default())
    }

    pub fn with_settings(settings: DispatchSettings) -> Self {
        let clock = Arc::new(MockClock::at_millis(NOW));
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

    /// A fixture already registered with the default options.
    pub fn registered() -> Self {
        let mut fixture = Self::new();
        fixture.dispatcher.register(None).unwrap();
        fixture
    }

    pub fn registered_with(settings: DispatchSettings) -> Self {
        let mut fixture = Self::with_settings(settings);
        fixture.dispatcher.register(None).unwrap();
        fixture
    }

    pub fn pending(&self) -> Vec<String> {
        self.log.pending("test", "streams_demo")
    }
}
