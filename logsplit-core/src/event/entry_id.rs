use crate::event::DecodeError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifier of an entry in an append-only log.
///
/// Two parts: the millisecond time the entry was appended and a sequence
/// number disambiguating entries appended within the same millisecond.
/// Ordering is by time, then sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId {
    pub millis: u64,
    pub seq: u64,
}

impl EntryId {
    pub const fn new(millis: u64, seq: u64) -> Self {
        Self { millis, seq }
    }

    /// The id to assign to an entry appended at `millis` after `self`.
    ///
    /// Never goes backwards, even if the clock does.
    pub fn successor(&self, millis: u64) -> Self {
        if millis > self.millis {
            Self::new(millis, 0)
        } else {
            Self::new(self.millis, self.seq + 1)
        }
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.millis, self.seq)
    }
}

impl FromStr for EntryId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DecodeError::MalformedId(s.to_string());

        let (millis, seq) = s.split_once('-').ok_or_else(malformed)?;
        let millis = millis.parse::<u64>().map_err(|_| malformed())?;
        let seq = seq.parse::<u64>().map_err(|_| malformed())?;

        Ok(Self::new(millis, seq))
    }
}
