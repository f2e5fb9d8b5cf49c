use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::WorkingHours;

pub use shared_models::{Doctor, WorkingWindow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub timezone: Option<String>,
    pub working_hours: WorkingHours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsRequest {
    pub doctor_id: Uuid,
    pub date_iso: NaiveDate,
    pub appt_type: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub slots: Vec<DateTime<FixedOffset>>,
}
