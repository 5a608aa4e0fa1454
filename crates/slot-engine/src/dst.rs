//! DST transition policies for working-day boundaries.
//!
//! Working hours are wall-clock times. On transition days a boundary such as
//! `02:30` may not exist (spring forward) or may exist twice (fall back), so
//! turning it into an instant needs a rule.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for boundaries that fall during DST transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Read a non-existent local time with the offset in force before the gap,
    /// which moves it forward by the gap length (02:30 becomes 03:30).
    /// Ambiguous times take the earlier instant.
    #[default]
    ShiftForward,
    /// A day whose boundary does not exist offers no slots at all.
    /// Ambiguous times still take the earlier instant.
    Skip,
}

impl DstPolicy {
    /// Resolve a wall-clock time in `tz` to an instant, or `None` when the
    /// policy drops it.
    pub fn resolve(self, tz: Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => match self {
                DstPolicy::Skip => None,
                DstPolicy::ShiftForward => Some(shift_past_gap(tz, local)),
            },
        }
    }
}

/// Resolve a wall-clock time the way [`DstPolicy::ShiftForward`] does.
/// Total: every local time maps to exactly one instant.
pub fn shift_forward(tz: Tz, local: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => shift_past_gap(tz, local),
    }
}

fn shift_past_gap(tz: Tz, local: NaiveDateTime) -> DateTime<Tz> {
    // Transitions are never a day apart, so the offset one day earlier is the
    // one in force right before the gap.
    let before = tz
        .offset_from_utc_datetime(&(local - Duration::days(1)))
        .fix();
    let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
    Utc.from_utc_datetime(&utc).with_timezone(&tz)
}
