//! Key layout of the derived structures.

use crate::event::{EntryId, Severity};

/// Counter set holding one member per severity.
pub const COUNTER_KEY: &str = "severities";

/// Value of the `type` label on every severity series.
pub const SERIES_TYPE: &str = "logs";

pub fn severity_stream(severity: &Severity) -> String {
    severity.as_str().to_string()
}

pub fn series_key(severity: &Severity) -> String {
    format!("ts:{severity}")
}

pub fn archive_key(prefix: &str, day_start_millis: i64, id: &EntryId) -> String {
    format!("{prefix}:{day_start_millis}:{id}")
}

/// Marker recording that `consumer` has fanned out entry `id`.
pub fn done_key(prefix: &str, consumer: &str, id: &EntryId) -> String {
    format!("{prefix}:done:{consumer}:{id}")
}
