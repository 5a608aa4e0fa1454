//! Working-hours policy and its JSON loader.
//!
//! The policy is built once at startup and then only read. Validation lives
//! here, so the engine can assume every policy it receives is well formed.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::dst::DstPolicy;
use crate::error::PolicyError;

const DEFAULT_TIMEZONE: &str = "Europe/Kyiv";

/// Opening hours and the single break of one working day, as wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    open: NaiveTime,
    close: NaiveTime,
    break_start: NaiveTime,
    break_end: NaiveTime,
}

impl DayHours {
    /// Build a day, requiring `open < close` and `break_start <= break_end`.
    /// A zero-length break means the day has no break.
    pub fn new(
        open: NaiveTime,
        close: NaiveTime,
        break_start: NaiveTime,
        break_end: NaiveTime,
    ) -> Result<Self, PolicyError> {
        if open >= close {
            return Err(PolicyError::OpenAfterClose {
                open: open.format("%H:%M").to_string(),
                close: close.format("%H:%M").to_string(),
            });
        }
        if break_start > break_end {
            return Err(PolicyError::BreakReversed {
                start: break_start.format("%H:%M").to_string(),
                end: break_end.format("%H:%M").to_string(),
            });
        }
        Ok(Self {
            open,
            close,
            break_start,
            break_end,
        })
    }

    pub fn without_break(open: NaiveTime, close: NaiveTime) -> Result<Self, PolicyError> {
        Self::new(open, close, open, open)
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    pub fn break_start(&self) -> NaiveTime {
        self.break_start
    }

    pub fn break_end(&self) -> NaiveTime {
        self.break_end
    }

    pub fn has_break(&self) -> bool {
        self.break_start < self.break_end
    }
}

/// Immutable working-hours policy for one resource in one timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingHoursPolicy {
    timezone: Tz,
    /// Indexed by `Weekday::num_days_from_monday`; `None` is a closed day.
    week: [Option<DayHours>; 7],
    dst_policy: DstPolicy,
}

impl WorkingHoursPolicy {
    /// Same hours on every day of the week.
    pub fn new(timezone: Tz, hours: DayHours) -> Self {
        Self {
            timezone,
            week: [Some(hours); 7],
            dst_policy: DstPolicy::default(),
        }
    }

    /// Override one weekday; `None` closes it.
    pub fn with_day(mut self, day: Weekday, hours: Option<DayHours>) -> Self {
        self.week[day.num_days_from_monday() as usize] = hours;
        self
    }

    pub fn with_dst_policy(mut self, dst_policy: DstPolicy) -> Self {
        self.dst_policy = dst_policy;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }

    /// Hours for `day`, or `None` when the resource is closed that day.
    pub fn hours_on(&self, day: Weekday) -> Option<&DayHours> {
        self.week[day.num_days_from_monday() as usize].as_ref()
    }

    /// Parse and validate a working-hours JSON document.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let doc: PolicyDocument = serde_json::from_str(json)?;
        doc.into_policy()
    }

    /// Read and validate a working-hours JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let policy = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), timezone = %policy.timezone, "loaded working hours");
        Ok(policy)
    }
}

// ---------------------------------------------------------------------------
// On-disk document
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PolicyDocument {
    #[serde(default = "default_timezone")]
    timezone: String,
    workday_start: String,
    workday_end: String,
    break_start: String,
    break_end: String,
    #[serde(default)]
    dst_policy: DstPolicy,
    #[serde(default)]
    days: BTreeMap<String, DayEntry>,
}

/// A weekday override: either the literal string `"closed"` or a set of hours.
#[derive(Deserialize)]
#[serde(untagged)]
enum DayEntry {
    Keyword(String),
    Hours(DayDocument),
}

/// Hours for one weekday. Break times fall back to the global break when omitted.
#[derive(Deserialize)]
struct DayDocument {
    workday_start: String,
    workday_end: String,
    break_start: Option<String>,
    break_end: Option<String>,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, PolicyError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| PolicyError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

impl PolicyDocument {
    fn into_policy(self) -> Result<WorkingHoursPolicy, PolicyError> {
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| PolicyError::InvalidTimezone(self.timezone.clone()))?;

        let break_start = parse_time("break_start", &self.break_start)?;
        let break_end = parse_time("break_end", &self.break_end)?;
        let hours = DayHours::new(
            parse_time("workday_start", &self.workday_start)?,
            parse_time("workday_end", &self.workday_end)?,
            break_start,
            break_end,
        )?;

        let mut policy = WorkingHoursPolicy::new(timezone, hours).with_dst_policy(self.dst_policy);

        for (name, entry) in self.days {
            let day: Weekday = name
                .parse()
                .map_err(|_| PolicyError::InvalidWeekday(name.clone()))?;
            let day_hours = match entry {
                DayEntry::Keyword(word) if word.eq_ignore_ascii_case("closed") => None,
                DayEntry::Keyword(word) => {
                    return Err(PolicyError::InvalidDayEntry { day: name, value: word });
                }
                DayEntry::Hours(doc) => {
                    let day_break_start = match doc.break_start.as_deref() {
                        Some(value) => parse_time("break_start", value)?,
                        None => break_start,
                    };
                    let day_break_end = match doc.break_end.as_deref() {
                        Some(value) => parse_time("break_end", value)?,
                        None => break_end,
                    };
                    Some(DayHours::new(
                        parse_time("workday_start", &doc.workday_start)?,
                        parse_time("workday_end", &doc.workday_end)?,
                        day_break_start,
                        day_break_end,
                    )?)
                }
            };
            policy = policy.with_day(day, day_hours);
        }

        Ok(policy)
    }
}
