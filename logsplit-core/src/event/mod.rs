//! Decoding of raw source-log entries into fan-out events.
//!
//! A source delivers [`RawEntry`] values: an opaque id string plus the
//! field/value pairs stored with the entry. Producers put the whole log
//! event, JSON-encoded, in a single `json` field. [`decode`] turns that into
//! an [`Event`] carrying a parsed [`EntryId`], the lower-cased [`Severity`]
//! and the payload itself.

mod decode;
mod entry_id;
mod error;
mod severity;


pub(crate) use decode::json_kind;
pub use decode::{Event, PAYLOAD_FIELD, Payload, RawEntry, SEVERITY_FIELD, decode};
pub use entry_id::EntryId;
pub use error::DecodeError;
pub use severity::Severity;
