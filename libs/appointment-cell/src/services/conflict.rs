use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::SchedulingStore;
use shared_models::{Appointment, SchedulingError};

use crate::models::ConflictCheckResponse;

pub struct ConflictDetectionService {
    store: Arc<dyn SchedulingStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    /// Appointments of `doctor_id` sharing an instant with `[start, end)`.
    /// Bookings that only touch the interval are not conflicts.
    pub async fn check_conflicts<Tz: TimeZone>(
        &self,
        doctor_id: Uuid,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<ConflictCheckResponse, SchedulingError> {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        debug!("Checking conflicts for doctor {} from {} to {}", doctor_id, start, end);

        if start >= end {
            return Err(SchedulingError::InvalidArgument(
                "Interval start must be before its end".to_string(),
            ));
        }

        let conflicting_appointments: Vec<Appointment> = self
            .store
            .list_appointments_overlapping(doctor_id, start, end)
            .await?
            .into_iter()
            .filter(|appointment| appointment.overlaps(start, end))
            .collect();

        let has_conflict = !conflicting_appointments.is_empty();
        if has_conflict {
            warn!("Conflict detected for doctor {} - {} conflicting appointments",
                  doctor_id, conflicting_appointments.len());
        }

        Ok(ConflictCheckResponse {
            has_conflict,
            conflicting_appointments,
        })
    }
}
