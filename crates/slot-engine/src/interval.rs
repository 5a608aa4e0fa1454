//! Time interval and slot value types.
//!
//! Every interval is half-open, `[start, end)`, and keeps the UTC offset it
//! was constructed with so that output slots echo the caller's offset back.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// A half-open `[start, end)` interval of absolute time with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = SlotError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        TimeInterval::new(raw.start, raw.end)
    }
}

impl TimeInterval {
    /// Build an interval, rejecting empty or reversed ranges.
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self> {
        if start >= end {
            return Err(SlotError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Two half-open intervals overlap iff `a.start < b.end && b.start < a.end`.
    /// Touching intervals (one ends where the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A free slot offered to a client: exactly one requested duration long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub duration_minutes: i64,
}

impl Slot {
    /// Slot `[start, end)`, where `end - start == duration` and `duration` is positive.
    pub(crate) fn spanning(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        duration: Duration,
    ) -> Self {
        Self {
            start,
            end,
            duration_minutes: duration.num_minutes(),
        }
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }
}

impl From<Slot> for TimeInterval {
    fn from(slot: Slot) -> Self {
        slot.interval()
    }
}
