use crate::clock::{Clock, SystemClock, epoch_millis};
use crate::event::EntryId;
use crate::store::{LogStore, StoreError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

/// Operations that can be made to fail on a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Append,
    Increment,
    Sample,
    Document,
    Marker,
    Flag,
    CounterRead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: u64,
    pub value: i64,
}

type Fields = Vec<(String, String)>;

#[derive(Default)]
struct StreamState {
    last_id: Option<EntryId>,
    entries: VecDeque<(EntryId, Fields)>,
}

#[derive(Default)]
struct SeriesState {
    labels: Vec<(String, String)>,
    samples: Vec<Sample>,
}

/// In-process [`LogStore`].
///
/// Each map shard is locked for the duration of a single operation, which
/// gives the same per-key atomicity the fan-out relies on from a real store.
/// Individual operations can be switched to fail with [`MemoryStore::fail`].
pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    streams: DashMap<String, StreamState>,
    counters: DashMap<String, HashMap<String, i64>>,
    series: DashMap<String, SeriesState>,
    documents: DashMap<String, String>,
    strings: DashMap<String, String>,
    /// Marker key to its expiry, in epoch millis.
    markers: DashMap<String, u64>,
    faults: Mutex<HashSet<StoreOp>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            streams: DashMap::new(),
            counters: DashMap::new(),
            series: DashMap::new(),
            documents: DashMap::new(),
            strings: DashMap::new(),
            markers: DashMap::new(),
            faults: Mutex::new(HashSet::new()),
        }
    }

    /// Make every subsequent `op` fail until [`MemoryStore::heal`] is called.
    pub fn fail(&self, op: StoreOp) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op);
    }

    pub fn heal(&self, op: StoreOp) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&op);
    }

    fn check(&self, op: StoreOp, command: &'static str) -> Result<(), StoreError> {
        let faults = self.faults.lock().unwrap_or_else(PoisonError::into_inner);
        if faults.contains(&op) {
            return Err(StoreError::Unavailable(format!("{command} refused")));
        }
        Ok(())
    }

    fn now_millis(&self) -> u64 {
        epoch_millis(self.clock.now())
    }

    pub fn set_flag(&self, key: &str, value: &str) {
        self.strings.insert(key.to_string(), value.to_string());
    }

    pub fn stream(&self, name: &str) -> Vec<(EntryId, Fields)> {
        self.streams
            .get(name)
            .map(|s| s.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn stream_len(&self, name: &str) -> usize {
        self.streams.get(name).map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn stream_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.streams.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn counter(&self, key: &str, member: &str) -> Option<i64> {
        self.counters
            .get(key)
            .and_then(|members| members.get(member).copied())
    }

    pub fn samples(&self, series: &str) -> Vec<Sample> {
        self.series
            .get(series)
            .map(|s| s.samples.clone())
            .unwrap_or_default()
    }

    pub fn series_labels(&self, series: &str) -> Vec<(String, String)> {
        self.series
            .get(series)
            .map(|s| s.labels.clone())
            .unwrap_or_default()
    }

    pub fn document(&self, key: &str) -> Option<String> {
        self.documents.get(key).map(|d| d.value().clone())
    }

    pub fn document_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.documents.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl LogStore for MemoryStore {
    fn append_capped(
        &self,
        stream: &str,
        max_len: u64,
        field: &str,
        value: &str,
    ) -> Result<EntryId, StoreError> {
        self.check(StoreOp::Append, "XADD")?;
        let now = self.now_millis();

        let mut state = self.streams.entry(stream.to_string()).or_default();
        let id = match state.last_id {
            Some(last) => last.successor(now),
            None => EntryId::new(now, 0),
        };

        state.last_id = Some(id);
        state
            .entries
            .push_back((id, vec![(field.to_string(), value.to_string())]));

        while state.entries.len() as u64 > max_len {
            state.entries.pop_front();
        }

        Ok(id)
    }

    fn increment_counter(&self, key: &str, member: &str, delta: i64) -> Result<i64, StoreError> {
        self.check(StoreOp::Increment, "ZINCRBY")?;

        let mut members = self.counters.entry(key.to_string()).or_default();
        let value = members.entry(member.to_string()).or_insert(0);
        *value += delta;
        Ok(*value)
    }

    fn add_sample(
        &self,
        series: &str,
        value: i64,
        labels: &[(&str, &str)],
    ) -> Result<u64, StoreError> {
        self.check(StoreOp::Sample, "TS.ADD")?;
        let now = self.now_millis();

        let mut state = self.series.entry(series.to_string()).or_default();
        if state.samples.is_empty() && state.labels.is_empty() {
            state.labels = labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        }

        let timestamp = match state.samples.last() {
            Some(last) if last.timestamp >= now => last.timestamp + 1,
            _ => now,
        };
        state.samples.push(Sample { timestamp, value });

        Ok(timestamp)
    }

    fn set_document(&self, key: &str, document: &str) -> Result<(), StoreError> {
        self.check(StoreOp::Document, "JSON.SET")?;
        self.documents.insert(key.to_string(), document.to_string());
        Ok(())
    }

    fn has_marker(&self, key: &str) -> Result<bool, StoreError> {
        self.check(StoreOp::Marker, "EXISTS")?;
        let now = self.now_millis();

        Ok(self.markers.get(key).is_some_and(|expires| *expires > now))
    }

    fn set_marker(&self, key: &str, ttl_ms: u64) -> Result<bool, StoreError> {
        self.check(StoreOp::Marker, "SET")?;
        let now = self.now_millis();
        let expires = now.saturating_add(ttl_ms);

        match self.markers.entry(key.to_string()) {
            Entry::Occupied(live) if *live.get() > now => Ok(false),
            Entry::Occupied(mut stale) => {
                stale.insert(expires);
                Ok(true)
            }
            Entry::Vacant(slot) => {
                slot.insert(expires);
                Ok(true)
            }
        }
    }

    fn read_flag(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(StoreOp::Flag, "GET")?;
        Ok(self.strings.get(key).map(|v| v.value().clone()))
    }

    fn counters(&self, key: &str) -> Result<Vec<(String, i64)>, StoreError> {
        self.check(StoreOp::CounterRead, "ZRANGE")?;

        let mut all: Vec<(String, i64)> = self
            .counters
            .get(key)
            .map(|members| members.iter().map(|(m, v)| (m.clone(), *v)).collect())
            .unwrap_or_default();

        all.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(all)
    }
}
