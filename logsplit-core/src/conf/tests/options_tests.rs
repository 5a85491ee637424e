use crate::conf::{ConfigError, OptionMap, OptionType, TriggerOptions, resolve};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn options(value: Value) -> OptionMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("options must be an object"),
    }
}

#[test]
fn defaults_apply_without_options() {
    let resolved = TriggerOptions::resolve(None).unwrap();

    assert_eq!(resolved.stream_name, "test");
    assert_eq!(resolved.consumer_name, "streams_demo");
    assert_eq!(resolved.log_prefix, "logs");
}

#[test]
fn present_options_override_defaults() {
    let opts = options(json!({ "stream_name": "ingest", "log_prefix": "archive" }));

    let resolved = TriggerOptions::resolve(Some(&opts)).unwrap();

    assert_eq!(
        resolved,
        TriggerOptions {
            stream_name: "ingest".into(),
            consumer_name: "streams_demo".into(),
            log_prefix: "archive".into(),
        }
    );
}

#[test]
fn unknown_options_are_ignored() {
    let opts = options(json!({ "colour": 7, "window": "big" }));

    assert_eq!(
        TriggerOptions::resolve(Some(&opts)).unwrap(),
        TriggerOptions::default()
    );
}

#[test]
fn wrong_type_names_the_option() {
    let opts = options(json!({ "consumer_name": 12 }));

    let err = TriggerOptions::resolve(Some(&opts)).unwrap_err();

    assert!(matches!(
        &err,
        ConfigError::TypeMismatch {
            name,
            expected: OptionType::String,
            found: "number",
        } if name == "consumer_name"
    ));
    assert_eq!(err.option_name(), Some("consumer_name"));
    assert_eq!(
        err.to_string(),
        "option 'consumer_name' must be a string, found number"
    );
}

#[test]
fn null_is_not_absent() {
    let opts = options(json!({ "stream_name": null }));

    let err = TriggerOptions::resolve(Some(&opts)).unwrap_err();

    assert_eq!(err.option_name(), Some("stream_name"));
}

#[test]
fn resolve_checks_non_string_types() {
    let opts = options(json!({ "depth": 3, "flag": "yes" }));

    assert_eq!(
        resolve(Some(&opts), "depth", json!(1), OptionType::Number).unwrap(),
        json!(3)
    );
    assert_eq!(
        resolve(Some(&opts), "missing", json!(false), OptionType::Boolean).unwrap(),
        json!(false)
    );
    assert!(resolve(Some(&opts), "flag", json!(true), OptionType::Boolean).is_err());
}
