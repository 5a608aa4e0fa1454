//! Error types for slot-engine operations.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Errors produced by the slot engine itself.
///
/// An empty slot list is never an error: a valid request that finds nothing
/// returns `Ok(vec![])`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// The requested window does not start strictly before it ends.
    #[error("Invalid range: window start {start} is not before window end {end}")]
    InvalidRange {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// The requested slot duration is zero or negative.
    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    /// An interval was constructed with `start >= end`.
    #[error("Invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}

/// A slot lookup that went through a [`BusySource`](crate::source::BusySource).
///
/// The source's own error type is carried as-is in `Source`, so callers can
/// match on or downcast the original failure.
#[derive(Error, Debug)]
pub enum LookupError<E> {
    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("Busy-interval source failed: {0}")]
    Source(#[source] E),
}

/// Errors from loading or validating a working-hours document.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Failed to read working hours from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Working hours JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid time of day '{value}' for {field} (expected HH:MM)")]
    InvalidTime { field: &'static str, value: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),

    #[error("Invalid day entry for {day}: {value}")]
    InvalidDayEntry { day: String, value: String },

    #[error("Workday must open before it closes ({open} >= {close})")]
    OpenAfterClose { open: String, close: String },

    #[error("Break must not end before it starts ({start} > {end})")]
    BreakReversed { start: String, end: String },
}

/// Failures a booking conversation cannot turn into a reply for the client.
#[derive(Error, Debug)]
pub enum DialogueError {
    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("Busy-interval source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Answerer failed: {0}")]
    Answer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, SlotError>;
