//! Working-hours filter for candidate slots.
//!
//! Day boundaries are built from the slot start's local calendar date only.
//! A slot that would run past midnight into the next day is therefore
//! rejected, and shifts that span midnight cannot be expressed.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime};

use crate::interval::Slot;
use crate::policy::WorkingHoursPolicy;

/// Check whether `[start, end)` sits fully inside working hours of its day
/// and does not overlap that day's break.
pub fn passes_working_hours(slot: &Slot, policy: &WorkingHoursPolicy) -> bool {
    within_working_hours(slot.start, slot.end, policy)
}

/// Same check as [`passes_working_hours`] on a bare pair of instants.
pub fn within_working_hours(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    policy: &WorkingHoursPolicy,
) -> bool {
    let tz = policy.timezone();
    let local_start = start.with_timezone(&tz);
    let date = local_start.date_naive();

    let Some(hours) = policy.hours_on(date.weekday()) else {
        return false;
    };

    let boundary = |time: NaiveTime| policy.dst_policy().resolve(tz, date.and_time(time));

    let (Some(day_open), Some(day_close)) = (boundary(hours.open()), boundary(hours.close()))
    else {
        return false;
    };
    if start < day_open.fixed_offset() || end > day_close.fixed_offset() {
        return false;
    }

    if hours.has_break() {
        let (Some(break_start), Some(break_end)) =
            (boundary(hours.break_start()), boundary(hours.break_end()))
        else {
            return false;
        };
        if start < break_end.fixed_offset() && end > break_start.fixed_offset() {
            return false;
        }
    }

    true
}
