use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::SchedulingError;

pub use shared_models::{Appointment, AppointmentType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Uuid,
    /// ISO 8601 timestamp; must carry an offset.
    pub start_at: String,
    pub appt_type: String,
    pub patient_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentListQuery {
    pub date_iso: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConflictCheckQuery {
    pub doctor_id: Uuid,
    pub start_at: DateTime<FixedOffset>,
    pub end_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<Appointment>,
}

/// Parses a caller-supplied start instant. Timestamps without an offset are
/// rejected rather than guessed.
pub fn parse_start_at(raw: &str) -> Result<DateTime<FixedOffset>, SchedulingError> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant);
    }
    if let Ok(instant) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Ok(instant);
    }
    if raw.ends_with('Z') {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M") {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    let is_naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").is_ok();
    if is_naive {
        return Err(SchedulingError::InvalidArgument(
            "start_at must include timezone info (ISO offset)".to_string(),
        ));
    }

    Err(SchedulingError::InvalidArgument(format!("Invalid start_at: {}", raw)))
}

pub fn parse_date_iso(raw: &str) -> Result<NaiveDate, SchedulingError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw.trim()).map(|dt| dt.date_naive()))
        .map_err(|_| SchedulingError::InvalidArgument("Invalid date_iso".to_string()))
}

/// Creation timestamps are recorded in the doctor's timezone.
pub fn now_in(tz: chrono_tz::Tz) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&tz).fixed_offset()
}
