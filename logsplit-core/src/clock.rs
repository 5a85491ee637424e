use chrono::{DateTime, Local, NaiveTime, Offset, TimeZone, Utc};
use std::ops::Add;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of "now" for the fan-out steps and the in-memory backends.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Debug)]
pub struct MockClock {
    now: RwLock<SystemTime>,
}

impl Clock for MockClock {
    fn now(&self) -> SystemTime {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    pub fn with_time(time: SystemTime) -> Self {
        Self {
            now: RwLock::new(time),
        }
    }

    pub fn at_millis(millis: u64) -> Self {
        Self::with_time(UNIX_EPOCH + Duration::from_millis(millis))
    }

    pub fn new() -> Self {
        Self::with_time(SystemTime::now())
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now = now.add(duration);
    }
}

/// Milliseconds since the Unix epoch, clamped to zero for pre-epoch times.
pub fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Midnight of the calendar day containing `now` in `tz`, as epoch millis.
///
/// Zones that skip midnight on a DST transition fall back to the offset in
/// effect at `now`.
pub fn day_start_millis<Tz: TimeZone>(now: SystemTime, tz: &Tz) -> i64 {
    let local = DateTime::<Utc>::from(now).with_timezone(tz);
    let midnight = local.date_naive().and_time(NaiveTime::MIN);

    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| {
            let offset_secs = i64::from(local.offset().fix().local_minus_utc());
            (midnight.and_utc().timestamp() - offset_secs) * 1000
        })
}

/// Day bucket for archive keys: the host's local day boundary.
pub fn local_day_start_millis(now: SystemTime) -> i64 {
    day_start_millis(now, &Local)
}

pub fn utc_day_start_millis(now: SystemTime) -> i64 {
    day_start_millis(now, &Utc)
}
