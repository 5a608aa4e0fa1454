//! Free-text date range input, turned into a [`SlotRequest`].
//!
//! Clients type ranges like `з 15.07 по 20.07` or `from 15.07 to 20.07`.
//! The year is supplied by the caller (normally the current year).

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use regex::Regex;

use crate::dst::shift_forward;
use crate::engine::SlotRequest;
use crate::error::Result;

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:з|from)\s+(\d{1,2})\.(\d{1,2})\s+(?:по|to)\s+(\d{1,2})\.(\d{1,2})")
        .expect("date range pattern is valid")
});

/// A pair of calendar dates; `start` is inclusive and `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Anchor both dates at local midnight in `tz` and build a request.
    ///
    /// Midnight falling into a DST gap is read with the pre-gap offset.
    pub fn to_request(&self, tz: Tz, duration_minutes: i64) -> Result<SlotRequest> {
        let midnight =
            |date: NaiveDate| shift_forward(tz, date.and_time(NaiveTime::MIN)).fixed_offset();
        SlotRequest::new(midnight(self.start), midnight(self.end), duration_minutes)
    }
}

/// Find a `D.M to D.M` range anywhere in `text`.
///
/// Returns `None` when there is no match, either date does not exist in
/// `year`, or the start is not strictly before the end.
pub fn parse_date_range(text: &str, year: i32) -> Option<DateRange> {
    let caps = RANGE_PATTERN.captures(text)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let start = NaiveDate::from_ymd_opt(year, number(2)?, number(1)?)?;
    let end = NaiveDate::from_ymd_opt(year, number(4)?, number(3)?)?;

    (start < end).then_some(DateRange { start, end })
}
