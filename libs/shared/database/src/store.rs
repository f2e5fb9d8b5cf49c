use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use uuid::Uuid;

use shared_models::{Appointment, Doctor, NewAppointment, NewDoctor, SchedulingError};

use crate::supabase::SupabaseError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused an appointment overlapping an existing one.
    #[error("Appointment overlaps an existing booking")]
    Overlap,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    #[error("{0}")]
    InvalidArgument(String),
}

impl From<SupabaseError> for StoreError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotFound(msg) => StoreError::NotFound(msg),
            SupabaseError::Decode(msg) => StoreError::Decode(msg),
            other => StoreError::Request(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<SchedulingError> for StoreError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidArgument(msg) => StoreError::InvalidArgument(msg),
            other => StoreError::Request(other.to_string()),
        }
    }
}

impl From<StoreError> for SchedulingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Overlap => SchedulingError::already_booked(),
            StoreError::InvalidArgument(msg) => SchedulingError::InvalidArgument(msg),
            other => SchedulingError::Storage(other.to_string()),
        }
    }
}

/// The narrow query interface the scheduling core reads and writes through.
///
/// Implementations must refuse to insert an appointment whose `[start, end)`
/// overlaps another appointment of the same doctor, returning
/// [`StoreError::Overlap`].
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, StoreError>;

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError>;

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError>;

    /// All appointments of a doctor, ordered by start.
    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, StoreError>;

    /// Appointments starting within `date`'s calendar day in `tz`, ordered by start.
    async fn list_appointments_for_doctor_on_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Appointments with `start_at < end` and `end_at > start`.
    async fn list_appointments_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError>;

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment, StoreError>;
}
