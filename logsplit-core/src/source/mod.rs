//! The source event log and its consumer-group delivery.
//!
//! A dispatcher subscribes to a source stream as a named consumer group and
//! pulls at most `window` entries per read. Delivery is at-least-once: an
//! entry stays pending until acknowledged and may be handed out again after
//! a crash or explicit redelivery.

mod error;
mod memory;
#[cfg(feature = "redis")]
mod redis_source;


pub use error::SourceError;
pub use memory::MemoryLog;
#[cfg(feature = "redis")]
pub use redis_source::RedisSource;

use crate::event::RawEntry;
use serde::Serialize;

/// A registered consumer of a source stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    /// Consumer identity; doubles as the consumer-group name.
    pub consumer: String,
    pub stream: String,
    /// The stream may be trimmed externally; missing bodies are tolerated.
    pub trimmed: bool,
    /// Maximum entries delivered per read.
    pub window: usize,
}

impl Subscription {
    pub fn group(&self) -> &str {
        &self.consumer
    }

    /// Name of the reader within the consumer group.
    pub fn reader(&self) -> String {
        format!("{}-streamreader", self.consumer)
    }
}

pub trait EventSource: Send + Sync {
    /// Create or replace the consumer group for `subscription`.
    ///
    /// Subscribing again with the same identity must not duplicate delivery.
    fn subscribe(&self, subscription: &Subscription) -> Result<(), SourceError>;

    /// Deliver up to `subscription.window` entries. An empty result means
    /// nothing is available right now.
    fn read(&self, subscription: &Subscription) -> Result<Vec<RawEntry>, SourceError>;

    /// Mark an entry as processed so it is not delivered again.
    fn ack(&self, subscription: &Subscription, id: &str) -> Result<(), SourceError>;

    /// Hand every delivered-but-unacknowledged entry out again, once each,
    /// ahead of new entries.
    fn redeliver(&self, subscription: &Subscription) -> Result<(), SourceError>;
}
