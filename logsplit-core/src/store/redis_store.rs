use crate::event::EntryId;
use crate::store::{LogStore, StoreError};
use redis::{Client, Cmd, Connection, FromRedisValue, RedisError};
use std::sync::Mutex;

/// [`LogStore`] backed by Redis with the RedisTimeSeries and RedisJSON
/// modules loaded.
pub struct RedisStore {
    conn: Mutex<Connection>,
}

impl RedisStore {
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::connect(&client)
    }

    pub fn connect(client: &Client) -> Result<Self, StoreError> {
        let conn = client
            .get_connection()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn query<T: FromRedisValue>(&self, command: &'static str, cmd: &Cmd) -> Result<T, StoreError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))?;

        cmd.query(&mut *conn).map_err(|e| classify(command, e))
    }
}

pub(crate) fn classify(command: &'static str, err: RedisError) -> StoreError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::command(command, err.to_string())
    }
}

impl LogStore for RedisStore {
    fn append_capped(
        &self,
        stream: &str,
        max_len: u64,
        field: &str,
        value: &str,
    ) -> Result<EntryId, StoreError> {
        let mut cmd = redis::cmd("XADD");
        cmd.arg(stream)
            .arg("MAXLEN")
            .arg("~")
            .arg(max_len)
            .arg("*")
            .arg(field)
            .arg(value);

        let id: String = self.query("XADD", &cmd)?;
        id.parse::<EntryId>().map_err(|e| StoreError::Corrupt {
            key: stream.to_string(),
            message: e.to_string(),
        })
    }

    fn increment_counter(&self, key: &str, member: &str, delta: i64) -> Result<i64, StoreError> {
        let mut cmd = redis::cmd("ZINCRBY");
        cmd.arg(key).arg(delta).arg(member);

        // Sorted-set scores come back as floats.
        let score: f64 = self.query("ZINCRBY", &cmd)?;
        Ok(score as i64)
    }

    fn add_sample(
        &self,
        series: &str,
        value: i64,
        labels: &[(&str, &str)],
    ) -> Result<u64, StoreError> {
        let mut cmd = redis::cmd("TS.ADD");
        cmd.arg(series)
            .arg("*")
            .arg(value)
            .arg("ON_DUPLICATE")
            .arg("LAST");

        if !labels.is_empty() {
            cmd.arg("LABELS");
            for (name, label) in labels {
                cmd.arg(*name).arg(*label);
            }
        }

        self.query("TS.ADD", &cmd)
    }

    fn set_document(&self, key: &str, document: &str) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("JSON.SET");
        cmd.arg(key).arg("$").arg(document);

        self.query("JSON.SET", &cmd)
    }

    fn has_marker(&self, key: &str) -> Result<bool, StoreError> {
        let mut cmd = redis::cmd("EXISTS");
        cmd.arg(key);

        let found: i64 = self.query("EXISTS", &cmd)?;
        Ok(found > 0)
    }

    fn set_marker(&self, key: &str, ttl_ms: u64) -> Result<bool, StoreError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(1).arg("NX").arg("PX").arg(ttl_ms);

        // Nil reply means the key was already there.
        let reply: Option<String> = self.query("SET", &cmd)?;
        Ok(reply.is_some())
    }

    fn read_flag(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);

        self.query("GET", &cmd)
    }

    fn counters(&self, key: &str) -> Result<Vec<(String, i64)>, StoreError> {
        let mut cmd = redis::cmd("ZREVRANGE");
        cmd.arg(key).arg(0).arg(-1).arg("WITHSCORES");

        let scored: Vec<(String, f64)> = self.query("ZREVRANGE", &cmd)?;
        Ok(scored
            .into_iter()
            .map(|(member, score)| (member, score as i64))
            .collect())
    }
}
