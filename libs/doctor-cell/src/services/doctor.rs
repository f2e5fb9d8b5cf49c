use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{AppState, SchedulingStore};
use shared_models::scheduling::{parse_timezone, SchedulingConfig};
use shared_models::{Doctor, NewDoctor, SchedulingError};

use crate::models::CreateDoctorRequest;

pub struct DoctorService {
    store: Arc<dyn SchedulingStore>,
    scheduling: Arc<SchedulingConfig>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn SchedulingStore>, scheduling: Arc<SchedulingConfig>) -> Self {
        Self { store, scheduling }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.store), Arc::clone(&state.scheduling))
    }

    /// Register a doctor. The timezone defaults to the configured default
    /// and must be a known IANA name.
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, SchedulingError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(SchedulingError::InvalidArgument("Doctor name must not be empty".to_string()));
        }

        let tz = match request.timezone.as_deref().filter(|tz| !tz.is_empty()) {
            Some(tz_name) => parse_timezone(tz_name)?,
            None => self.scheduling.default_timezone,
        };

        info!("Creating doctor: {}", name);
        let now = Utc::now().with_timezone(&tz).fixed_offset();

        let doctor = self.store.insert_doctor(NewDoctor {
            name: name.to_string(),
            timezone: tz.name().to_string(),
            working_hours: request.working_hours,
            is_active: true,
            created_at: now,
            updated_at: now,
        }).await?;

        info!("Created doctor with ID: {}", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, SchedulingError> {
        debug!("Fetching doctor with ID: {}", doctor_id);

        self.store
            .get_doctor(doctor_id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound("Doctor not found".to_string()))
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, SchedulingError> {
        Ok(self.store.list_doctors().await?)
    }
}
