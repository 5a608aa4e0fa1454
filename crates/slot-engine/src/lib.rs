//! # slot-engine
//!
//! Free appointment slot computation for a single resource's calendar.
//!
//! Given a requested window, a slot length, the busy intervals reported by a
//! calendar, and a working-hours policy (open/close time plus one break), the
//! engine returns fixed-length, non-overlapping, chronologically ordered
//! slots. The computation is pure: all I/O happens in the collaborators
//! behind [`source::BusySource`] and [`source::AppointmentBook`].
//!
//! ## Modules
//!
//! - [`engine`]: gap carving: window + busy intervals → candidate slots
//! - [`hours`]: working-hours and break filter
//! - [`interval`]: `TimeInterval` and `Slot` value types
//! - [`policy`]: working-hours policy and its JSON loader
//! - [`dst`]: DST policies for working-day boundaries
//! - [`source`]: busy-interval source and appointment book seams
//! - [`request`]: free-text date ranges → slot requests
//! - [`format`]: slot listings and message splitting for chat
//! - [`dialogue`]: per-client booking conversation
//! - [`error`]: Error types

pub mod dialogue;
pub mod dst;
pub mod engine;
pub mod error;
pub mod format;
pub mod hours;
pub mod interval;
pub mod policy;
pub mod request;
pub mod source;

pub use dialogue::{BookingDialogue, Conversation, DialogueSettings, Stage};
pub use engine::{compute_for_request, compute_free_slots, SlotRequest};
pub use error::{DialogueError, LookupError, PolicyError, SlotError};
pub use hours::passes_working_hours;
pub use interval::{Slot, TimeInterval};
pub use policy::{DayHours, WorkingHoursPolicy};
pub use source::{find_slots, AppointmentBook, AppointmentDetails, BusySource};
