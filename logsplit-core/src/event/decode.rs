use crate::event::{DecodeError, EntryId, Severity};
use serde_json::{Map, Value};

/// Name of the single field holding the JSON-encoded payload.
pub const PAYLOAD_FIELD: &str = "json";

/// Payload field carrying the event's log level.
pub const SEVERITY_FIELD: &str = "log_level";

pub type Payload = Map<String, Value>;

/// An entry exactly as a source delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub id: String,
    pub fields: Vec<(String, String)>,
}

impl RawEntry {
    pub fn new(id: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// A well-formed entry carrying `json` as its payload field.
    pub fn with_payload(id: impl Into<String>, json: impl Into<String>) -> Self {
        Self::new(id, vec![(PAYLOAD_FIELD.to_string(), json.into())])
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Entries whose body was trimmed away arrive with an id but no fields.
    pub fn is_trimmed(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A decoded log event, owned for the duration of one fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EntryId,
    pub severity: Severity,
    pub payload: Payload,
    /// The payload field as the producer encoded it.
    pub json: String,
}

/// Decode a delivered entry.
///
/// Returns `Ok(None)` for a trimmed entry when the subscription is
/// trim-aware; without trim awareness a trimmed entry is an error.
pub fn decode(raw: &RawEntry, trimmed: bool) -> Result<Option<Event>, DecodeError> {
    let id = raw.id.parse::<EntryId>()?;

    if raw.is_trimmed() {
        return if trimmed {
            Ok(None)
        } else {
            Err(DecodeError::Trimmed)
        };
    }

    let json = raw
        .field(PAYLOAD_FIELD)
        .ok_or(DecodeError::MissingField(PAYLOAD_FIELD))?;

    let payload = match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(DecodeError::MalformedPayload(format!(
                "expected an object, found {}",
                json_kind(&other)
            )));
        }
        Err(e) => return Err(DecodeError::MalformedPayload(e.to_string())),
    };

    let severity = payload
        .get(SEVERITY_FIELD)
        .and_then(Value::as_str)
        .map(Severity::new)
        .ok_or(DecodeError::MissingSeverity)?;

    Ok(Some(Event {
        id,
        severity,
        payload,
        json: json.to_string(),
    }))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
