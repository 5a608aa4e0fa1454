//! A calendar kept in a local JSON file.
//!
//! Stands in for a hosted calendar: it reports busy intervals and records
//! booked appointments, which count as busy from then on.
//!
//! ```json
//! {
//!   "busy": [{ "start": "2026-07-15T09:40:00+03:00", "end": "2026-07-15T10:20:00+03:00" }],
//!   "appointments": []
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use slot_engine::{AppointmentBook, AppointmentDetails, BusySource, Slot, TimeInterval};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Failed to access calendar file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Calendar file {path} is not valid: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CalendarDocument {
    #[serde(default)]
    busy: Vec<TimeInterval>,
    #[serde(default)]
    appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Appointment {
    id: String,
    resource_id: String,
    #[serde(flatten)]
    interval: TimeInterval,
    summary: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attendee_email: Option<String>,
}

#[derive(Debug)]
pub struct JsonCalendar {
    path: Option<PathBuf>,
    doc: CalendarDocument,
}

impl JsonCalendar {
    /// A calendar with nothing booked that is never written anywhere.
    pub fn empty() -> Self {
        Self {
            path: None,
            doc: CalendarDocument::default(),
        }
    }

    /// Load `path`; a file that does not exist yet is an empty calendar.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CalendarError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let doc = match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| CalendarError::Json {
                path: display,
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "calendar file missing, starting empty");
                CalendarDocument::default()
            }
            Err(source) => {
                return Err(CalendarError::Io {
                    path: display,
                    source,
                })
            }
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            doc,
        })
    }

    fn save(&self) -> Result<(), CalendarError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let display = || path.display().to_string();
        let json = serde_json::to_string_pretty(&self.doc).map_err(|source| CalendarError::Json {
            path: display(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| CalendarError::Io {
            path: display(),
            source,
        })
    }
}

impl BusySource for JsonCalendar {
    type Error = CalendarError;

    fn fetch_busy(
        &self,
        resource_id: &str,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<TimeInterval>, Self::Error> {
        let booked = self
            .doc
            .appointments
            .iter()
            .filter(|a| a.resource_id == resource_id)
            .map(|a| a.interval);

        Ok(self
            .doc
            .busy
            .iter()
            .copied()
            .chain(booked)
            .filter(|i| i.start() < window_end && i.end() > window_start)
            .collect())
    }
}

impl AppointmentBook for JsonCalendar {
    type Error = CalendarError;

    fn create_appointment(
        &mut self,
        resource_id: &str,
        slot: &Slot,
        details: &AppointmentDetails,
    ) -> Result<String, Self::Error> {
        let id = format!("appt-{}", self.doc.appointments.len() + 1);
        self.doc.appointments.push(Appointment {
            id: id.clone(),
            resource_id: resource_id.to_string(),
            interval: slot.interval(),
            summary: details.summary.clone(),
            description: details.description.clone(),
            attendee_email: details.attendee_email.clone(),
        });
        if let Err(e) = self.save() {
            self.doc.appointments.pop();
            return Err(e);
        }
        Ok(id)
    }
}
