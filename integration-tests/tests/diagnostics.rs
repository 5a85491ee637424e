use integration_tests::harness::{TestPipeline, capture};
use logsplit_core::dispatch::DispatchSettings;
use logsplit_core::store::StoreOp;
use pretty_assertions::assert_eq;
use serde_json::json;
use tracing::Level;

#[test]
fn registration_is_logged_with_its_parameters() {
    // Arrange
    let mut pipeline = TestPipeline::new(DispatchSettings::default());

    // Act
    let (_, events) = capture(|| pipeline.dispatcher.register(None).map(|_| ()));

    // Assert
    let registered = events
        .iter()
        .find(|e| e.message() == Some("stream trigger registered"))
        .unwrap();
    assert_eq!(registered.level, Level::INFO);
    assert_eq!(registered.field("consumer"), Some("streams_demo"));
    assert_eq!(registered.field("stream"), Some("test"));
    assert_eq!(registered.field("window"), Some("1"));
    assert_eq!(registered.field("trimmed"), Some("true"));
}

#[test]
fn rejected_option_is_logged_as_error() {
    // Arrange
    let mut pipeline = TestPipeline::new(DispatchSettings::default());
    let options = json!({"stream_name": {"nested": true}});

    // Act
    let (result, events) = capture(|| {
        pipeline
            .dispatcher
            .register(options.as_object())
            .map(|_| ())
    });

    // Assert
    assert!(result.is_err());
    assert!(events.iter().any(|e| e.level == Level::ERROR
        && e.field("error")
            .is_some_and(|m| m.contains("'stream_name' must be a string, found object"))));
}

#[test]
fn undecodable_entry_is_logged_with_its_id() {
    // Arrange
    let mut pipeline = TestPipeline::registered(None).unwrap();
    let id = pipeline.emit("{oops");

    // Act
    let (report, events) = capture(|| pipeline.drain());

    // Assert
    assert_eq!(report.rejected, 1);
    let warning = events
        .iter()
        .find(|e| e.message() == Some("dropping undecodable entry"))
        .unwrap();
    assert_eq!(warning.level, Level::WARN);
    assert_eq!(warning.field("entry_id"), Some(id.to_string().as_str()));
    assert!(warning.field("error").unwrap().contains("payload"));
}

#[test]
fn storage_failure_is_logged_with_step_and_committed_steps() {
    // Arrange
    let mut pipeline = TestPipeline::registered(None).unwrap();
    pipeline.store.fail(StoreOp::Sample);
    let id = pipeline.emit(r#"{"log_level":"info"}"#);

    // Act
    let (report, events) = capture(|| pipeline.drain());

    // Assert
    assert_eq!(report.failed, 1);
    let failure = events
        .iter()
        .find(|e| e.message() == Some("fan-out failed; entry left pending"))
        .unwrap();
    assert_eq!(failure.level, Level::ERROR);
    assert_eq!(failure.field("entry_id"), Some(id.to_string().as_str()));
    assert_eq!(failure.field("step"), Some("aggregate_recorder"));
    assert_eq!(failure.field("committed"), Some(r#"["severity_router"]"#));
}
