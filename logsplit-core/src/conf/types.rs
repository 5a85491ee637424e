use crate::conf::{ConfigError, OptionMap};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";
pub const DEFAULT_MAX_STREAM_LEN: u64 = 2_000_000;
pub const DEFAULT_DEDUPE_TTL_MS: u64 = 86_400_000;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// How long a read blocks waiting for new entries.
    #[serde(default = "default_block_ms")]
    pub block_ms: u64,

    /// Poll interval while paused, and back-off after a source failure.
    #[serde(default = "default_idle_sleep_ms")]
    pub idle_sleep_ms: u64,

    pub pid_file: Option<String>,

    /// Directory for daily-rolled log files. Logs go to stdout when unset.
    pub log_dir: Option<PathBuf>,

    /// Key whose value `"0"` pauses the consumer loop.
    pub control_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            block_ms: default_block_ms(),
            idle_sleep_ms: default_idle_sleep_ms(),
            pid_file: None,
            log_dir: None,
            control_key: None,
        }
    }
}

fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}

fn default_block_ms() -> u64 {
    1000
}

fn default_idle_sleep_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    /// Entries delivered per invocation.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Whether the source log may be trimmed underneath the consumer.
    #[serde(default = "default_true")]
    pub trimmed: bool,

    /// Approximate cap on each severity stream.
    #[serde(default = "default_max_stream_len")]
    pub max_stream_len: u64,

    /// Skip entries this consumer has already fanned out.
    #[serde(default = "default_true")]
    pub dedupe: bool,

    /// How long a processed-entry marker is kept, in milliseconds.
    #[serde(default = "default_dedupe_ttl_ms")]
    pub dedupe_ttl_ms: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            trimmed: true,
            max_stream_len: default_max_stream_len(),
            dedupe: true,
            dedupe_ttl_ms: default_dedupe_ttl_ms(),
        }
    }
}

fn default_window() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_max_stream_len() -> u64 {
    DEFAULT_MAX_STREAM_LEN
}

fn default_dedupe_ttl_ms() -> u64 {
    DEFAULT_DEDUPE_TTL_MS
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Free-form trigger options, type-checked at registration.
    #[serde(default)]
    pub options: OptionMap,
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger.window == 0 {
            return Err(ConfigError::invalid("trigger.window", "must be at least 1"));
        }

        if self.trigger.max_stream_len == 0 {
            return Err(ConfigError::invalid(
                "trigger.max_stream_len",
                "must be at least 1",
            ));
        }

        if self.server.redis_url.trim().is_empty() {
            return Err(ConfigError::invalid("server.redis_url", "must not be empty"));
        }

        Ok(())
    }

    /// The option map as handed to registration; `None` when empty.
    pub fn options(&self) -> Option<&OptionMap> {
        if self.options.is_empty() {
            None
        } else {
            Some(&self.options)
        }
    }
}
