//! Trigger options: the small, free-form option map consulted at
//! registration time.
//!
//! Every option has a default and an expected JSON type. An absent option
//! takes its default; a present option of the wrong type is a hard error so
//! registration never proceeds with a half-understood configuration.

use crate::conf::ConfigError;
use crate::event::json_kind;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

pub type OptionMap = Map<String, Value>;

pub const STREAM_NAME: &str = "stream_name";
pub const CONSUMER_NAME: &str = "consumer_name";
pub const LOG_PREFIX: &str = "log_prefix";

pub const DEFAULT_STREAM_NAME: &str = "test";
pub const DEFAULT_CONSUMER_NAME: &str = "streams_demo";
pub const DEFAULT_LOG_PREFIX: &str = "logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl OptionType {
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Object, Value::Object(_))
                | (Self::Array, Value::Array(_))
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl Display for OptionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up `name` in `options`, falling back to `default` when absent.
pub fn resolve(
    options: Option<&OptionMap>,
    name: &str,
    default: Value,
    expected: OptionType,
) -> Result<Value, ConfigError> {
    let Some(value) = options.and_then(|o| o.get(name)) else {
        return Ok(default);
    };

    if !expected.matches(value) {
        return Err(ConfigError::TypeMismatch {
            name: name.to_string(),
            expected,
            found: json_kind(value),
        });
    }

    Ok(value.clone())
}

pub fn resolve_string(
    options: Option<&OptionMap>,
    name: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match resolve(options, name, Value::from(default), OptionType::String)? {
        Value::String(s) => Ok(s),
        _ => Ok(default.to_string()),
    }
}

/// The three operating parameters of a fan-out registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerOptions {
    /// Source stream consumed by the trigger.
    pub stream_name: String,
    /// Consumer identity, also the consumer-group name.
    pub consumer_name: String,
    /// Prefix of archive document keys.
    pub log_prefix: String,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            consumer_name: DEFAULT_CONSUMER_NAME.to_string(),
            log_prefix: DEFAULT_LOG_PREFIX.to_string(),
        }
    }
}

impl TriggerOptions {
    /// Resolve every option. Unrecognized keys are ignored.
    pub fn resolve(options: Option<&OptionMap>) -> Result<Self, ConfigError> {
        Ok(Self {
            stream_name: resolve_string(options, STREAM_NAME, DEFAULT_STREAM_NAME)?,
            consumer_name: resolve_string(options, CONSUMER_NAME, DEFAULT_CONSUMER_NAME)?,
            log_prefix: resolve_string(options, LOG_PREFIX, DEFAULT_LOG_PREFIX)?,
        })
    }
}
