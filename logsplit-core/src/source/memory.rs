use crate::clock::{Clock, SystemClock, epoch_millis};
use crate::event::{EntryId, RawEntry};
use crate::source::{EventSource, SourceError, Subscription};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Group {
    subscription: Subscription,
    /// Absolute index of the next never-delivered entry.
    cursor: usize,
    /// Delivered but unacknowledged ids, in delivery order.
    pending: Vec<String>,
    redeliver: VecDeque<String>,
}

#[derive(Default)]
struct Stream {
    last_id: Option<EntryId>,
    /// Absolute index of `entries[0]`; everything before it was trimmed.
    first_index: usize,
    entries: VecDeque<RawEntry>,
    groups: HashMap<String, Group>,
}

impl Stream {
    fn end(&self) -> usize {
        self.first_index + self.entries.len()
    }
}

/// In-process append-only log with consumer groups.
///
/// New groups start at the end of the stream. Entries trimmed before a group
/// reached them are never delivered; pending entries trimmed before being
/// redelivered come back with no fields.
pub struct MemoryLog {
    clock: Arc<dyn Clock>,
    streams: Mutex<HashMap<String, Stream>>,
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryLog {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            streams: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Stream>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Producer side: append an entry with a generated id.
    pub fn append(&self, stream: &str, fields: Vec<(String, String)>) -> EntryId {
        let now = epoch_millis(self.clock.now());
        let mut streams = self.lock();
        let s = streams.entry(stream.to_string()).or_default();

        let id = match s.last_id {
            Some(last) => last.successor(now),
            None => EntryId::new(now, 0),
        };
        s.last_id = Some(id);
        s.entries.push_back(RawEntry::new(id.to_string(), fields));
        id
    }

    /// Append a payload under the `json` field, the producer convention.
    pub fn append_json(&self, stream: &str, json: &str) -> EntryId {
        self.append(
            stream,
            vec![(crate::event::PAYLOAD_FIELD.to_string(), json.to_string())],
        )
    }

    /// Drop the oldest entries so at most `max_len` remain.
    pub fn trim(&self, stream: &str, max_len: usize) {
        let mut streams = self.lock();
        if let Some(s) = streams.get_mut(stream) {
            while s.entries.len() > max_len {
                s.entries.pop_front();
                s.first_index += 1;
            }
        }
    }

    pub fn len(&self, stream: &str) -> usize {
        self.lock().get(stream).map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, stream: &str) -> bool {
        self.len(stream) == 0
    }

    /// Hand every pending entry of `group` out again on the next reads.
    pub fn redeliver_pending(&self, stream: &str, group: &str) {
        let mut streams = self.lock();
        if let Some(g) = streams.get_mut(stream).and_then(|s| s.groups.get_mut(group)) {
            g.redeliver = g.pending.iter().cloned().collect();
        }
    }

    pub fn pending(&self, stream: &str, group: &str) -> Vec<String> {
        self.lock()
            .get(stream)
            .and_then(|s| s.groups.get(group))
            .map(|g| g.pending.clone())
            .unwrap_or_default()
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        let streams = self.lock();
        let mut subs: Vec<Subscription> = streams
            .values()
            .flat_map(|s| s.groups.values().map(|g| g.subscription.clone()))
            .collect();
        subs.sort_by(|a, b| (&a.stream, &a.consumer).cmp(&(&b.stream, &b.consumer)));
        subs
    }
}

impl EventSource for MemoryLog {
    fn subscribe(&self, subscription: &Subscription) -> Result<(), SourceError> {
        let mut streams = self.lock();
        let s = streams.entry(subscription.stream.clone()).or_default();
        let end = s.end();

        s.groups
            .entry(subscription.group().to_string())
            .and_modify(|g| g.subscription = subscription.clone())
            .or_insert_with(|| Group {
                subscription: subscription.clone(),
                cursor: end,
                pending: Vec::new(),
                redeliver: VecDeque::new(),
            });

        Ok(())
    }

    fn read(&self, subscription: &Subscription) -> Result<Vec<RawEntry>, SourceError> {
        let not_subscribed = || SourceError::NotSubscribed {
            consumer: subscription.consumer.clone(),
            stream: subscription.stream.clone(),
        };

        let mut streams = self.lock();
        let s = streams
            .get_mut(&subscription.stream)
            .ok_or_else(not_subscribed)?;

        let Stream {
            first_index,
            entries,
            groups,
            ..
        } = s;
        let g = groups
            .get_mut(subscription.group())
            .ok_or_else(not_subscribed)?;

        let window = subscription.window.max(1);
        let mut batch = Vec::with_capacity(window);

        if !g.redeliver.is_empty() {
            while batch.len() < window {
                let Some(id) = g.redeliver.pop_front() else {
                    break;
                };
                let entry = entries
                    .iter()
                    .find(|e| e.id == id)
                    .cloned()
                    .unwrap_or_else(|| RawEntry::new(id, Vec::new()));
                batch.push(entry);
            }
            return Ok(batch);
        }

        g.cursor = g.cursor.max(*first_index);
        while batch.len() < window {
            let Some(entry) = entries.get(g.cursor - *first_index) else {
                break;
            };
            g.pending.push(entry.id.clone());
            batch.push(entry.clone());
            g.cursor += 1;
        }

        Ok(batch)
    }

    fn ack(&self, subscription: &Subscription, id: &str) -> Result<(), SourceError> {
        let mut streams = self.lock();
        if let Some(g) = streams
            .get_mut(&subscription.stream)
            .and_then(|s| s.groups.get_mut(subscription.group()))
        {
            g.pending.retain(|p| p != id);
            g.redeliver.retain(|p| p != id);
        }
        Ok(())
    }

    fn redeliver(&self, subscription: &Subscription) -> Result<(), SourceError> {
        self.redeliver_pending(&subscription.stream, subscription.group());
        Ok(())
    }
}
