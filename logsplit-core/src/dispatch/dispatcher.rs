use crate::clock::{Clock, local_day_start_millis};
use crate::conf::{OptionMap, TriggerOptions};
use crate::dispatch::{BatchReport, DispatchError, DispatchSettings, EventOutcome, RegisterError};
use crate::event::{EntryId, RawEntry, decode};
use crate::fanout::{ArchiveWriter, FanoutPipeline, StepFailure, StorageWriteError};
use crate::source::{EventSource, Subscription};
use crate::store::{LogStore, keys};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// Step name reported when the processed-entry marker cannot be read.
const MARKER_STEP: &str = "dedupe_marker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherState {
    Unregistered,
    Registered,
    Running,
    Failed,
}

struct Registration {
    options: TriggerOptions,
    subscription: Subscription,
    pipeline: FanoutPipeline,
}

impl Registration {
    fn done_key(&self, id: &EntryId) -> String {
        keys::done_key(&self.options.log_prefix, &self.options.consumer_name, id)
    }
}

pub struct Dispatcher {
    store: Arc<dyn LogStore>,
    source: Arc<dyn EventSource>,
    clock: Arc<dyn Clock>,
    settings: DispatchSettings,
    day_start: fn(SystemTime) -> i64,
    state: DispatcherState,
    registration: Option<Registration>,
    /// Entries whose fan-out failed and have not completed since.
    outstanding: BTreeSet<EntryId>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn LogStore>,
        source: Arc<dyn EventSource>,
        clock: Arc<dyn Clock>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            store,
            source,
            clock,
            settings,
            day_start: local_day_start_millis,
            state: DispatcherState::Unregistered,
            registration: None,
            outstanding: BTreeSet::new(),
        }
    }

    /// Bucket archive documents with a custom day boundary. Takes effect at
    /// the next registration.
    pub fn with_day_start(mut self, day_start: fn(SystemTime) -> i64) -> Self {
        self.day_start = day_start;
        self
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.registration.as_ref().map(|r| &r.subscription)
    }

    pub fn options(&self) -> Option<&TriggerOptions> {
        self.registration.as_ref().map(|r| &r.options)
    }

    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    /// Entries whose fan-out failed and has not succeeded since.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Resolve the trigger options and subscribe to the source stream.
    ///
    /// Any failure leaves the dispatcher `Failed` without a subscription.
    /// Registering again under the same identity replaces the earlier
    /// subscription.
    pub fn register(&mut self, options: Option<&OptionMap>) -> Result<&Subscription, RegisterError> {
        if self.state == DispatcherState::Failed {
            return Err(RegisterError::Failed);
        }

        let resolved = match TriggerOptions::resolve(options) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(error = %e, "refusing to register with invalid trigger options");
                self.state = DispatcherState::Failed;
                return Err(e.into());
            }
        };

        let subscription = Subscription {
            consumer: resolved.consumer_name.clone(),
            stream: resolved.stream_name.clone(),
            trimmed: self.settings.trimmed,
            window: self.settings.window,
        };

        if let Err(e) = self.source.subscribe(&subscription) {
            error!(
                error = %e,
                consumer = %subscription.consumer,
                stream = %subscription.stream,
                "subscription failed"
            );
            self.state = DispatcherState::Failed;
            return Err(e.into());
        }

        let same_identity = self
            .registration
            .as_ref()
            .is_some_and(|r| r.options == resolved);
        if !same_identity {
            self.outstanding.clear();
        }

        let archive = ArchiveWriter::new(resolved.log_prefix.clone(), self.clock.clone())
            .with_day_start(self.day_start);
        let pipeline = FanoutPipeline::standard(self.settings.max_stream_len, archive);

        info!(
            consumer = %subscription.consumer,
            stream = %subscription.stream,
            window = subscription.window,
            trimmed = subscription.trimmed,
            dedupe = self.settings.dedupe,
            log_prefix = %resolved.log_prefix,
            replaced = same_identity,
            "stream trigger registered"
        );

        self.state = DispatcherState::Registered;
        let registration = self.registration.insert(Registration {
            options: resolved,
            subscription,
            pipeline,
        });

        Ok(&registration.subscription)
    }

    fn ensure_registered(&self) -> Result<(), DispatchError> {
        match self.state {
            DispatcherState::Unregistered => Err(DispatchError::NotRegistered),
            DispatcherState::Failed => Err(DispatchError::Failed),
            DispatcherState::Registered | DispatcherState::Running => Ok(()),
        }
    }

    /// Read up to `window` entries from the source and fan each one out.
    ///
    /// Every entry is acknowledged except those whose fan-out failed; those
    /// stay pending and come back through [`Dispatcher::redeliver_failed`] or
    /// the source's own redelivery. A read failure is returned to the caller
    /// and leaves the registration intact.
    pub fn poll(&mut self) -> Result<BatchReport, DispatchError> {
        self.ensure_registered()?;
        let subscription = self
            .subscription()
            .cloned()
            .ok_or(DispatchError::NotRegistered)?;

        let entries = self.source.read(&subscription)?;
        let mut report = BatchReport {
            delivered: entries.len(),
            ..BatchReport::default()
        };
        if entries.is_empty() {
            return Ok(report);
        }

        for raw in &entries {
            let outcome = self.dispatch(raw)?;
            report.record(&outcome);

            if outcome.acknowledge() {
                if let Err(e) = self.source.ack(&subscription, &raw.id) {
                    warn!(entry_id = %raw.id, error = %e, "failed to acknowledge entry");
                }
            }
        }

        debug!(
            delivered = report.delivered,
            processed = report.processed,
            duplicates = report.duplicates,
            trimmed = report.trimmed,
            rejected = report.rejected,
            failed = report.failed,
            "batch complete"
        );

        Ok(report)
    }

    /// Ask the source to hand failed entries out again. Returns whether
    /// anything was outstanding.
    pub fn redeliver_failed(&mut self) -> Result<bool, DispatchError> {
        self.ensure_registered()?;
        if self.outstanding.is_empty() {
            return Ok(false);
        }

        if let Some(subscription) = self.subscription() {
            self.source.redeliver(subscription)?;
            info!(
                outstanding = self.outstanding.len(),
                "requested redelivery of failed entries"
            );
        }

        Ok(true)
    }

    /// Decode one delivered entry and run the fan-out for it.
    ///
    /// Does not acknowledge the entry; [`Dispatcher::poll`] does that.
    pub fn dispatch(&mut self, raw: &RawEntry) -> Result<EventOutcome, DispatchError> {
        self.ensure_registered()?;
        self.state = DispatcherState::Running;
        let outcome = self.process(raw);
        self.state = DispatcherState::Registered;
        outcome
    }

    fn process(&mut self, raw: &RawEntry) -> Result<EventOutcome, DispatchError> {
        let Some(reg) = self.registration.as_ref() else {
            return Err(DispatchError::NotRegistered);
        };

        let event = match decode(raw, reg.subscription.trimmed) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(entry_id = %raw.id, "entry trimmed from source; skipping");
                self.forget(&raw.id);
                return Ok(EventOutcome::Trimmed);
            }
            Err(e) => {
                warn!(entry_id = %raw.id, error = %e, "dropping undecodable entry");
                self.forget(&raw.id);
                return Ok(EventOutcome::Rejected(e));
            }
        };

        let done_key = reg.done_key(&event.id);
        if self.settings.dedupe {
            match self.store.has_marker(&done_key) {
                Ok(true) => {
                    debug!(entry_id = %event.id, "skipping redelivered entry");
                    self.outstanding.remove(&event.id);
                    return Ok(EventOutcome::Duplicate);
                }
                Ok(false) => {}
                Err(e) => {
                    let failure = StepFailure {
                        committed: Vec::new(),
                        error: StorageWriteError::new(MARKER_STEP, e),
                    };
                    error!(entry_id = %event.id, error = %failure, "dedupe marker unavailable");
                    self.outstanding.insert(event.id);
                    return Ok(EventOutcome::Failed(failure));
                }
            }
        }

        if let Err(failure) = reg.pipeline.run(self.store.as_ref(), &event) {
            error!(
                entry_id = %event.id,
                severity = %event.severity,
                step = failure.step(),
                committed = ?failure.committed,
                error = %failure.error,
                "fan-out failed; entry left pending"
            );
            self.outstanding.insert(event.id);
            return Ok(EventOutcome::Failed(failure));
        }

        debug!(entry_id = %event.id, severity = %event.severity, "entry fanned out");
        self.outstanding.remove(&event.id);

        if self.settings.dedupe {
            match self.store.set_marker(&done_key, self.settings.dedupe_ttl_ms) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(entry_id = %event.id, "entry was already marked done by another reader");
                }
                Err(e) => {
                    warn!(entry_id = %event.id, error = %e, "failed to mark entry done");
                }
            }
        }

        Ok(EventOutcome::Processed)
    }

    /// Drop an entry that will be acknowledged without a fan-out.
    fn forget(&mut self, raw_id: &str) {
        if let Ok(id) = raw_id.parse::<EntryId>() {
            self.outstanding.remove(&id);
        }
    }
}
