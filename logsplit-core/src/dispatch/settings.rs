use crate::conf::TriggerConfig;
use crate::conf::types::{DEFAULT_DEDUPE_TTL_MS, DEFAULT_MAX_STREAM_LEN};

/// Registration parameters that do not come from the trigger options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub window: usize,
    pub trimmed: bool,
    pub max_stream_len: u64,
    pub dedupe: bool,
    /// Lifetime of the per-entry processed marker.
    pub dedupe_ttl_ms: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            window: 1,
            trimmed: true,
            max_stream_len: DEFAULT_MAX_STREAM_LEN,
            dedupe: true,
            dedupe_ttl_ms: DEFAULT_DEDUPE_TTL_MS,
        }
    }
}

impl From<&TriggerConfig> for DispatchSettings {
    fn from(cfg: &TriggerConfig) -> Self {
        Self {
            window: cfg.window.max(1),
            trimmed: cfg.trimmed,
            max_stream_len: cfg.max_stream_len,
            dedupe: cfg.dedupe,
            dedupe_ttl_ms: cfg.dedupe_ttl_ms.max(1),
        }
    }
}
