//! Collaborator seams: where busy intervals come from and where bookings go.
//!
//! Both are I/O in a real deployment (a calendar API). The engine never calls
//! them itself; [`find_slots`] fetches first, then runs the pure computation.

use chrono::{DateTime, FixedOffset};

use crate::engine::{compute_for_request, SlotRequest};
use crate::error::LookupError;
use crate::interval::{Slot, TimeInterval};
use crate::policy::WorkingHoursPolicy;

/// Supplies the intervals during which a resource is unavailable.
pub trait BusySource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_busy(
        &self,
        resource_id: &str,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<TimeInterval>, Self::Error>;
}

/// What to write on a created calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDetails {
    pub summary: String,
    pub description: String,
    pub attendee_email: Option<String>,
}

/// Persists appointments. Availability is not re-checked here, so a slot
/// booked by someone else between lookup and booking is the implementor's
/// conflict to resolve.
pub trait AppointmentBook {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create the event and return its confirmation id.
    fn create_appointment(
        &mut self,
        resource_id: &str,
        slot: &Slot,
        details: &AppointmentDetails,
    ) -> Result<String, Self::Error>;
}

/// Fetch busy intervals for the request window, then compute free slots.
///
/// Source failures are returned unchanged in `LookupError::Source`; nothing
/// is retried.
pub fn find_slots<S: BusySource + ?Sized>(
    source: &S,
    resource_id: &str,
    request: &SlotRequest,
    policy: &WorkingHoursPolicy,
) -> Result<Vec<Slot>, LookupError<S::Error>> {
    let busy = source
        .fetch_busy(resource_id, request.window_start(), request.window_end())
        .map_err(LookupError::Source)?;

    let slots = compute_for_request(request, &busy, policy)?;

    tracing::debug!(
        resource_id,
        window_start = %request.window_start(),
        window_end = %request.window_end(),
        duration_minutes = request.duration_minutes(),
        busy = busy.len(),
        slots = slots.len(),
        "computed free slots"
    );

    Ok(slots)
}
