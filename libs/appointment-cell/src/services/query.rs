use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use shared_database::{AppState, SchedulingStore};
use shared_models::scheduling::{resolve_timezone, SchedulingConfig};
use shared_models::{Appointment, SchedulingError};

pub struct AppointmentQueryService {
    store: Arc<dyn SchedulingStore>,
    scheduling: Arc<SchedulingConfig>,
}

impl AppointmentQueryService {
    pub fn new(store: Arc<dyn SchedulingStore>, scheduling: Arc<SchedulingConfig>) -> Self {
        Self { store, scheduling }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.store), Arc::clone(&state.scheduling))
    }

    /// A doctor's appointments ordered by start, optionally limited to one
    /// calendar day in the doctor's timezone.
    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        info!("Listing appointments for doctor ID: {}", doctor_id);

        let doctor = self
            .store
            .get_doctor(doctor_id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound("Doctor not found".to_string()))?;

        let items = match date {
            Some(date) => {
                let tz = resolve_timezone(None, Some(doctor.timezone.as_str()), self.scheduling.default_timezone)?;
                self.store.list_appointments_for_doctor_on_date(doctor_id, date, tz).await?
            }
            None => self.store.list_appointments_for_doctor(doctor_id).await?,
        };

        info!("Found {} appointments", items.len());
        Ok(items)
    }
}
