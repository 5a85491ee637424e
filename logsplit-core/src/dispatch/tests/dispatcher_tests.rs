use super::{DAY_MS, Fixture, MIDNIGHT};
use crate::conf::{ConfigError, OptionMap};
use crate::dispatch::{DispatchError, DispatchSettings, DispatcherState, RegisterError};
use crate::event::RawEntry;
use crate::source::Subscription;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

fn options(value: serde_json::Value) -> OptionMap {
    value.as_object().cloned().unwrap()
}

#[test]
fn starts_unregistered_and_refuses_to_poll() {
    let mut fx = Fixture::new();

    assert_eq!(fx.dispatcher.state(), DispatcherState::Unregistered);
    assert!(matches!(
        fx.dispatcher.poll(),
        Err(DispatchError::NotRegistered)
    ));
}

#[test]
fn register_without_options_uses_defaults() {
    let mut fx = Fixture::new();

    let sub = fx.dispatcher.register(None).unwrap().clone();

    assert_eq!(
        sub,
        Subscription {
            consumer: "streams_demo".into(),
            stream: "test".into(),
            trimmed: true,
            window: 1,
        }
    );
    assert_eq!(fx.dispatcher.state(), DispatcherState::Registered);
    assert_eq!(fx.dispatcher.options().unwrap().log_prefix, "logs");
    assert_eq!(fx.log.subscriptions(), vec![sub]);
}

#[test]
fn register_applies_provided_options() {
    let mut fx = Fixture::new();
    let opts = options(json!({
        "stream_name": "app",
        "consumer_name": "splitter",
        "log_prefix": "archive",
        "unrelated": 42
    }));

    let sub = fx.dispatcher.register(Some(&opts)).unwrap();

    assert_eq!(sub.stream, "app");
    assert_eq!(sub.consumer, "splitter");
    assert_eq!(fx.dispatcher.options().unwrap().log_prefix, "archive");
}

#[test]
fn wrongly_typed_option_fails_without_subscribing() {
    let mut fx = Fixture::new();
    let opts = options(json!({ "stream_name": 5 }));

    let err = fx.dispatcher.register(Some(&opts)).unwrap_err();

    assert!(matches!(
        err,
        RegisterError::Config(ConfigError::TypeMismatch { ref name, found: "number", .. })
            if name == "stream_name"
    ));
    assert_eq!(fx.dispatcher.state(), DispatcherState::Failed);
    assert!(fx.dispatcher.subscription().is_none());
    assert!(fx.log.subscriptions().is_empty());
}

#[test]
fn failed_dispatcher_is_terminal() {
    let mut fx = Fixture::new();
    let bad = options(json!({ "consumer_name": true }));
    fx.dispatcher.register(Some(&bad)).unwrap_err();

    assert!(matches!(
        fx.dispatcher.register(None),
        Err(RegisterError::Failed)
    ));
    assert!(matches!(fx.dispatcher.poll(), Err(DispatchError::Failed)));
    assert!(fx.log.subscriptions().is_empty());
}

#[test]
fn re_registering_replaces_the_subscription() {
    let mut fx = Fixture::registered();

    fx.dispatcher.register(None).unwrap();

    assert_eq!(fx.log.subscriptions().len(), 1);
    assert_eq!(fx.dispatcher.state(), DispatcherState::Registered);
}

#[test]
fn empty_poll_reports_nothing() {
    let mut fx = Fixture::registered();

    let report = fx.dispatcher.poll().unwrap();

    assert!(report.is_empty());
    assert_eq!(fx.dispatcher.state(), DispatcherState::Registered);
}

#[test]
fn routes_payload_verbatim_to_severity_stream() {
    let mut fx = Fixture::registered();
    let payload = r#"{"log_level":"error","msg":"disk full","code":28}"#;
    fx.log.append_json("test", payload);

    let report = fx.dispatcher.poll().unwrap();

    assert_eq!(report.processed, 1);
    let stream = fx.store.stream("error");
    assert_eq!(stream.len(), 1);
    assert_eq!(
        stream[0].1,
        vec![("json".to_string(), payload.to_string())]
    );
    assert_eq!(fx.dispatcher.state(), DispatcherState::Registered);
}

#[test]
fn counter_and_series_track_every_event() {
    let mut fx = Fixture::registered();
    for _ in 0..3 {
        fx.log.append_json("test", r#"{"log_level":"info"}"#);
    }

    for _ in 0..3 {
        fx.dispatcher.poll().unwrap();
    }

    assert_eq!(fx.store.counter("severities", "info"), Some(3));
    let values: Vec<i64> = fx.store.samples("ts:info").iter().map(|s| s.value).collect();
    assert_eq!(values, vec![1, 2, 3]);
    assert_eq!(
        fx.store.series_labels("ts:info"),
        vec![
            ("log_level".to_string(), "info".to_string()),
            ("type".to_string(), "logs".to_string())
        ]
    );
}

#[test]
fn severities_differing_in_case_share_structures() {
    let mut fx = Fixture::registered();
    fx.log.append_json("test", r#"{"log_level":"ERROR"}"#);
    fx.log.append_json("test", r#"{"log_level":"error"}"#);

    fx.dispatcher.poll().unwrap();
    fx.dispatcher.poll().unwrap();

    assert_eq!(fx.store.stream_names(), vec!["error".to_string()]);
    assert_eq!(fx.store.counter("severities", "error"), Some(2));
    assert_eq!(fx.store.counter("severities", "ERROR"), None);
}

#[test]
fn archive_key_uses_processing_day_and_entry_id() {
    let mut fx = Fixture::registered();
    let payload = r#"{"log_level":"warn"}"#;
    let id = fx.log.append_json("test", payload);

    fx.dispatcher.poll().unwrap();

    let key = format!("logs:{MIDNIGHT}:{id}");
    assert_eq!(fx.store.document_keys(), vec![key.clone()]);
    assert_eq!(fx.store.document(&key).as_deref(), Some(payload));
}

#[test]
fn replay_on_same_day_overwrites_and_next_day_adds() {
    let settings = DispatchSettings {
        dedupe: false,
        ..Default::default()
    };
    let mut fx = Fixture::registered_with(settings);
    let raw = RawEntry::with_payload("1710510310250-0", r#"{"log_level":"info"}"#);

    fx.dispatcher.dispatch(&raw).unwrap();
    fx.dispatcher.dispatch(&raw).unwrap();
    assert_eq!(fx.store.document_keys().len(), 1);

    fx.clock.advance(Duration::from_millis(DAY_MS));
    fx.dispatcher.dispatch(&raw).unwrap();

    let next_day = MIDNIGHT + DAY_MS as i64;
    assert_eq!(
        fx.store.document_keys(),
        vec![
            format!("logs:{MIDNIGHT}:1710510310250-0"),
            format!("logs:{next_day}:1710510310250-0"),
        ]
    );
}

#[test]
fn window_bounds_each_poll() {
    let settings = DispatchSettings {
        window: 2,
        ..Default::default()
    };
    let mut fx = Fixture::registered_with(settings);
    for _ in 0..3 {
        fx.log.append_json("test", r#"{"log_level":"debug"}"#);
    }

    assert_eq!(fx.dispatcher.poll().unwrap().delivered, 2);
    assert_eq!(fx.dispatcher.poll().unwrap().delivered, 1);
    assert!(fx.pending().is_empty());
}

#[test]
fn dispatch_without_registration_is_refused() {
    let mut fx = Fixture::new();
    let raw = RawEntry::with_payload("1-0", r#"{"log_level":"info"}"#);

    assert!(matches!(
        fx.dispatcher.dispatch(&raw),
        Err(DispatchError::NotRegistered)
    ));
    assert!(fx.store.stream_names().is_empty());
}
