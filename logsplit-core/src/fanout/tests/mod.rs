
use crate::event::{Event, RawEntry, decode};

pub(super) fn event(id: &str, json: &str) -> Event {
    decode(&RawEntry::with_payload(id, json), true)
        .unwrap()
        .unwrap()
}
