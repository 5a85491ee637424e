//! Storage interface for the derived structures.
//!
//! Every write the fan-out performs goes through [`LogStore`]. The store is
//! injected as `Arc<dyn LogStore>`, so several dispatchers can share one
//! backend and tests can substitute [`MemoryStore`].

mod error;
pub mod keys;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;

#[cfg(test)]
mod tests;

pub use error::StoreError;
pub use memory::{MemoryStore, Sample, StoreOp};
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

use crate::event::EntryId;

pub trait LogStore: Send + Sync {
    /// Append one field/value pair to `stream` under a store-generated,
    /// strictly increasing id, trimming the stream to roughly `max_len`.
    fn append_capped(
        &self,
        stream: &str,
        max_len: u64,
        field: &str,
        value: &str,
    ) -> Result<EntryId, StoreError>;

    /// Atomically add `delta` to `member` of counter set `key`; returns the
    /// post-increment value.
    fn increment_counter(&self, key: &str, member: &str, delta: i64) -> Result<i64, StoreError>;

    /// Append `value` to `series` at a store-assigned "now" timestamp,
    /// creating the series with `labels` on first use.
    fn add_sample(
        &self,
        series: &str,
        value: i64,
        labels: &[(&str, &str)],
    ) -> Result<u64, StoreError>;

    /// Replace the whole JSON document at `key`.
    fn set_document(&self, key: &str, document: &str) -> Result<(), StoreError>;

    /// Whether an unexpired processed-entry marker exists at `key`.
    fn has_marker(&self, key: &str) -> Result<bool, StoreError>;

    /// Create the marker at `key` unless one already exists, expiring it
    /// after `ttl_ms`. Returns `false` when another writer got there first.
    fn set_marker(&self, key: &str, ttl_ms: u64) -> Result<bool, StoreError>;

    /// Read a plain string key, used for operator switches.
    fn read_flag(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// All members of counter set `key` with their values, highest first.
    fn counters(&self, key: &str) -> Result<Vec<(String, i64)>, StoreError>;
}
