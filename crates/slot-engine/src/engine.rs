//! Carve fixed-length free slots out of a window around busy intervals.
//!
//! Busy intervals are sorted, then a cursor walks the window: before each busy
//! interval it carves as many whole slots as fit, then jumps to the interval's
//! end. Overlapping busy intervals need no pre-merge because the cursor only
//! ever moves forward to the running maximum of the ends seen so far. The
//! carved slots are finally filtered against working hours.

use chrono::{DateTime, Duration, FixedOffset};

use crate::error::{Result, SlotError};
use crate::hours::passes_working_hours;
use crate::interval::{Slot, TimeInterval};
use crate::policy::WorkingHoursPolicy;

/// A validated request for slots of one length inside one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRequest {
    window_start: DateTime<FixedOffset>,
    window_end: DateTime<FixedOffset>,
    duration_minutes: i64,
}

impl SlotRequest {
    pub fn new(
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
        duration_minutes: i64,
    ) -> Result<Self> {
        validate(window_start, window_end, duration_minutes)?;
        Ok(Self {
            window_start,
            window_end,
            duration_minutes,
        })
    }

    pub fn window_start(&self) -> DateTime<FixedOffset> {
        self.window_start
    }

    pub fn window_end(&self) -> DateTime<FixedOffset> {
        self.window_end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }
}

fn validate(
    window_start: DateTime<FixedOffset>,
    window_end: DateTime<FixedOffset>,
    duration_minutes: i64,
) -> Result<()> {
    if window_start >= window_end {
        return Err(SlotError::InvalidRange {
            start: window_start,
            end: window_end,
        });
    }
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidDuration(duration_minutes));
    }
    Ok(())
}

/// Compute the free slots of `duration_minutes` inside `[window_start, window_end)`.
///
/// `busy` may be empty, unsorted, and overlapping. Returned slots are in
/// chronological order, exactly `duration_minutes` long, never overlap a busy
/// interval, and all pass [`passes_working_hours`]. A window with no room
/// yields an empty list, not an error.
///
/// # Errors
/// Returns `SlotError::InvalidRange` if `window_start >= window_end`.
/// Returns `SlotError::InvalidDuration` if `duration_minutes <= 0`.
pub fn compute_free_slots(
    window_start: DateTime<FixedOffset>,
    window_end: DateTime<FixedOffset>,
    duration_minutes: i64,
    busy: &[TimeInterval],
    policy: &WorkingHoursPolicy,
) -> Result<Vec<Slot>> {
    validate(window_start, window_end, duration_minutes)?;

    // A duration chrono cannot represent is longer than any window.
    let Some(duration) =
        Duration::try_minutes(duration_minutes).filter(|d| *d <= window_end - window_start)
    else {
        return Ok(Vec::new());
    };

    let slots = carve_slots(window_start, window_end, duration, busy)
        .into_iter()
        .filter(|slot| passes_working_hours(slot, policy))
        .collect();

    Ok(slots)
}

/// [`compute_free_slots`] for an already validated [`SlotRequest`].
pub fn compute_for_request(
    request: &SlotRequest,
    busy: &[TimeInterval],
    policy: &WorkingHoursPolicy,
) -> Result<Vec<Slot>> {
    compute_free_slots(
        request.window_start,
        request.window_end,
        request.duration_minutes,
        busy,
        policy,
    )
}

/// Gap carving without the working-hours filter.
fn carve_slots(
    window_start: DateTime<FixedOffset>,
    window_end: DateTime<FixedOffset>,
    duration: Duration,
    busy: &[TimeInterval],
) -> Vec<Slot> {
    let mut sorted: Vec<&TimeInterval> = busy.iter().collect();
    sorted.sort_by_key(|interval| (interval.start(), interval.end()));

    let mut slots = Vec::new();
    let mut cursor = window_start;

    for interval in sorted {
        // A busy interval reported past the window must not pull slots outside it.
        let limit = interval.start().min(window_end);
        carve_until(&mut cursor, limit, duration, &mut slots);
        // Slots keep the window's offset whatever offset the calendar reports in.
        cursor = cursor.max(interval.end().with_timezone(window_start.offset()));
    }

    carve_until(&mut cursor, window_end, duration, &mut slots);

    slots
}

/// Push back-to-back slots from `cursor` while a whole slot still ends by `limit`.
/// A remainder shorter than `duration` is left unused.
fn carve_until(
    cursor: &mut DateTime<FixedOffset>,
    limit: DateTime<FixedOffset>,
    duration: Duration,
    slots: &mut Vec<Slot>,
) {
    while let Some(end) = cursor.checked_add_signed(duration).filter(|end| *end <= limit) {
        slots.push(Slot::spanning(*cursor, end, duration));
        *cursor = end;
    }
}
