use crate::clock::MockClock;
use crate::event::EntryId;
use crate::store::{LogStore, MemoryStore, Sample, StoreError, StoreOp};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn store_at(millis: u64) -> (Arc<MockClock>, MemoryStore) {
    let clock = Arc::new(MockClock::at_millis(millis));
    let store = MemoryStore::new(clock.clone());
    (clock, store)
}

#[test]
fn append_assigns_increasing_ids_within_one_millisecond() {
    let (_, store) = store_at(1_000);

    let a = store.append_capped("info", 10, "json", "{}").unwrap();
    let b = store.append_capped("info", 10, "json", "{}").unwrap();

    assert_eq!(a, EntryId::new(1_000, 0));
    assert_eq!(b, EntryId::new(1_000, 1));
}

#[test]
fn append_trims_oldest_entries_beyond_cap() {
    let (_, store) = store_at(1_000);

    for i in 0..5 {
        store
            .append_capped("debug", 3, "json", &format!("{{\"n\":{i}}}"))
            .unwrap();
    }

    let entries = store.stream("debug");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].1, vec![("json".to_string(), "{\"n\":2}".to_string())]);
}

#[test]
fn counter_returns_post_increment_value() {
    let (_, store) = store_at(0);

    assert_eq!(store.increment_counter("severities", "error", 1).unwrap(), 1);
    assert_eq!(store.increment_counter("severities", "error", 1).unwrap(), 2);
    assert_eq!(store.increment_counter("severities", "info", 5).unwrap(), 5);
    assert_eq!(store.counter("severities", "error"), Some(2));
}

#[test]
fn concurrent_increments_are_not_lost() {
    let (_, store) = store_at(0);
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    store.increment_counter("severities", "warn", 1).unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.counter("severities", "warn"), Some(2_000));
}

#[test]
fn sample_timestamps_are_strictly_increasing_per_series() {
    let (clock, store) = store_at(5_000);

    store.add_sample("ts:info", 1, &[("log_level", "info")]).unwrap();
    store.add_sample("ts:info", 2, &[]).unwrap();
    clock.advance(std::time::Duration::from_millis(10));
    store.add_sample("ts:info", 3, &[]).unwrap();

    assert_eq!(
        store.samples("ts:info"),
        vec![
            Sample { timestamp: 5_000, value: 1 },
            Sample { timestamp: 5_001, value: 2 },
            Sample { timestamp: 5_010, value: 3 },
        ]
    );
    assert_eq!(
        store.series_labels("ts:info"),
        vec![("log_level".to_string(), "info".to_string())]
    );
}

#[test]
fn documents_are_replaced_whole() {
    let (_, store) = store_at(0);

    store.set_document("logs:0:1-0", r#"{"a":1}"#).unwrap();
    store.set_document("logs:0:1-0", r#"{"b":2}"#).unwrap();

    assert_eq!(store.document("logs:0:1-0").as_deref(), Some(r#"{"b":2}"#));
    assert_eq!(store.document_keys().len(), 1);
}

#[test]
fn marker_is_set_only_once_until_it_expires() {
    let (clock, store) = store_at(1_000);

    assert!(!store.has_marker("logs:done:c:1-0").unwrap());
    assert!(store.set_marker("logs:done:c:1-0", 500).unwrap());
    assert!(!store.set_marker("logs:done:c:1-0", 500).unwrap());
    assert!(store.has_marker("logs:done:c:1-0").unwrap());

    clock.advance(Duration::from_millis(500));

    assert!(!store.has_marker("logs:done:c:1-0").unwrap());
    assert!(store.set_marker("logs:done:c:1-0", 500).unwrap());
}

#[test]
fn racing_marker_writers_see_exactly_one_winner() {
    let store = Arc::new(MemoryStore::default());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || store.set_marker("logs:done:c:7-0", 60_000).unwrap())
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
}

#[test]
fn injected_faults_fail_only_that_operation() {
    let (_, store) = store_at(0);
    store.fail(StoreOp::Document);

    assert!(store.set_document("k", "{}").is_err());
    assert!(store.increment_counter("severities", "info", 1).is_ok());

    store.heal(StoreOp::Document);
    assert!(store.set_document("k", "{}").is_ok());
}

#[test]
fn counter_reads_fail_independently_of_increments() {
    let (_, store) = store_at(0);
    store.fail(StoreOp::Increment);

    assert!(store.increment_counter("severities", "info", 1).is_err());
    assert_eq!(store.counters("severities").unwrap(), Vec::new());

    store.heal(StoreOp::Increment);
    store.fail(StoreOp::CounterRead);
    store.increment_counter("severities", "info", 1).unwrap();

    assert!(matches!(
        store.counters("severities"),
        Err(StoreError::Unavailable(_))
    ));
    assert_eq!(store.counter("severities", "info"), Some(1));
}

#[test]
fn counters_are_listed_highest_first() {
    let (_, store) = store_at(0);
    store.increment_counter("severities", "info", 3).unwrap();
    store.increment_counter("severities", "error", 7).unwrap();
    store.increment_counter("severities", "debug", 3).unwrap();

    assert_eq!(
        store.counters("severities").unwrap(),
        vec![
            ("error".to_string(), 7),
            ("debug".to_string(), 3),
            ("info".to_string(), 3),
        ]
    );
}
