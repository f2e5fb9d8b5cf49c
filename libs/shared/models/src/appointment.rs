use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduling::{intervals_overlap, AppointmentType};

/// A confirmed booking. Appointments are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub appt_type: AppointmentType,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub patient_name: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Appointment {
    pub fn overlaps<Tz: chrono::TimeZone>(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> bool {
        intervals_overlap(self.start_at, self.end_at, start, end)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub appt_type: AppointmentType,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub patient_name: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl NewAppointment {
    pub fn overlaps(&self, existing: &Appointment) -> bool {
        existing.overlaps(self.start_at, self.end_at)
    }
}
