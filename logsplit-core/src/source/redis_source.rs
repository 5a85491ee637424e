use crate::event::RawEntry;
use crate::source::{EventSource, SourceError, Subscription};
use redis::streams::{StreamId, StreamReadReply};
use redis::{Client, Cmd, Connection, FromRedisValue, RedisError};
use std::sync::{Mutex, PoisonError};

/// [`EventSource`] reading a Redis stream through a consumer group.
///
/// After subscribing, and whenever redelivery is requested, the reader walks
/// its own pending list (starting from id `0`) before reading new entries
/// (`>`). The walk advances past every entry it hands out, so an entry that
/// keeps failing is offered once per walk rather than forever.
pub struct RedisSource {
    conn: Mutex<Connection>,
    block_ms: u64,
    /// Position in the pending list; `None` once it has been walked.
    backlog: Mutex<Option<String>>,
}

impl RedisSource {
    pub fn connect(client: &Client, block_ms: u64) -> Result<Self, SourceError> {
        let conn = client
            .get_connection()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            block_ms,
            backlog: Mutex::new(Some("0".to_string())),
        })
    }

    fn query<T: FromRedisValue>(&self, command: &'static str, cmd: &Cmd) -> Result<T, SourceError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| SourceError::Unavailable("connection lock poisoned".into()))?;

        cmd.query(&mut *conn).map_err(|e| classify(command, e))
    }

    /// Read pending entries after `position`, or block for new ones.
    fn read_from(
        &self,
        subscription: &Subscription,
        position: Option<&str>,
    ) -> Result<Vec<RawEntry>, SourceError> {
        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(subscription.group())
            .arg(subscription.reader())
            .arg("COUNT")
            .arg(subscription.window.max(1));

        if position.is_none() {
            cmd.arg("BLOCK").arg(self.block_ms);
        }

        cmd.arg("STREAMS")
            .arg(&subscription.stream)
            .arg(position.unwrap_or(">"));

        let reply: Option<StreamReadReply> = self.query("XREADGROUP", &cmd)?;
        Ok(reply
            .map(|r| r.keys.iter().flat_map(|k| k.ids.iter().map(to_raw)).collect())
            .unwrap_or_default())
    }

    fn set_backlog(&self, position: Option<String>) {
        *self.backlog.lock().unwrap_or_else(PoisonError::into_inner) = position;
    }
}

fn classify(command: &'static str, err: RedisError) -> SourceError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        SourceError::Unavailable(err.to_string())
    } else {
        SourceError::Command {
            command,
            message: err.to_string(),
        }
    }
}

fn to_raw(entry: &StreamId) -> RawEntry {
    let mut fields: Vec<(String, String)> = entry
        .map
        .iter()
        .filter_map(|(name, value)| {
            redis::from_redis_value::<String>(value)
                .ok()
                .map(|v| (name.clone(), v))
        })
        .collect();
    fields.sort();

    RawEntry::new(entry.id.clone(), fields)
}

impl EventSource for RedisSource {
    fn subscribe(&self, subscription: &Subscription) -> Result<(), SourceError> {
        let mut cmd = redis::cmd("XGROUP");
        cmd.arg("CREATE")
            .arg(&subscription.stream)
            .arg(subscription.group())
            .arg("$")
            .arg("MKSTREAM");

        match self.query::<()>("XGROUP", &cmd) {
            Ok(()) => {}
            Err(SourceError::Command { message, .. }) if message.contains("BUSYGROUP") => {
                tracing::debug!(
                    group = subscription.group(),
                    stream = %subscription.stream,
                    "consumer group already exists"
                );
            }
            Err(e) => return Err(e),
        }

        self.set_backlog(Some("0".to_string()));
        Ok(())
    }

    fn read(&self, subscription: &Subscription) -> Result<Vec<RawEntry>, SourceError> {
        let backlog = self
            .backlog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(position) = backlog {
            let entries = self.read_from(subscription, Some(&position))?;
            match entries.last() {
                Some(last) => {
                    self.set_backlog(Some(last.id.clone()));
                    return Ok(entries);
                }
                None => {
                    tracing::debug!(group = subscription.group(), "pending backlog walked");
                    self.set_backlog(None);
                }
            }
        }

        self.read_from(subscription, None)
    }

    fn ack(&self, subscription: &Subscription, id: &str) -> Result<(), SourceError> {
        let mut cmd = redis::cmd("XACK");
        cmd.arg(&subscription.stream).arg(subscription.group()).arg(id);

        self.query::<i64>("XACK", &cmd).map(|_| ())
    }

    fn redeliver(&self, _subscription: &Subscription) -> Result<(), SourceError> {
        self.set_backlog(Some("0".to_string()));
        Ok(())
    }
}
