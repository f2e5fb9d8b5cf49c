// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, warn};

use shared_database::{AppState, DoctorLocks, SchedulingStore};
use shared_models::scheduling::{resolve_timezone, weekday_index, SchedulingConfig};
use shared_models::{Appointment, Doctor, NewAppointment, SchedulingError};

use crate::models::now_in;
use crate::services::conflict::ConflictDetectionService;

pub struct AppointmentBookingService {
    store: Arc<dyn SchedulingStore>,
    scheduling: Arc<SchedulingConfig>,
    booking_locks: Arc<DoctorLocks>,
    conflict_service: ConflictDetectionService,
}

impl AppointmentBookingService {
    pub fn new(
        store: Arc<dyn SchedulingStore>,
        scheduling: Arc<SchedulingConfig>,
        booking_locks: Arc<DoctorLocks>,
    ) -> Self {
        Self {
            conflict_service: ConflictDetectionService::new(Arc::clone(&store)),
            store,
            scheduling,
            booking_locks,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.store),
            Arc::clone(&state.scheduling),
            Arc::clone(&state.booking_locks),
        )
    }

    /// Validate and book an appointment.
    ///
    /// Working hours are always evaluated in the doctor's own timezone. The
    /// doctor's booking lock is held from the overlap check through the
    /// insert, and the store refuses overlapping rows on its own as well.
    pub async fn create_appointment_with_checks(
        &self,
        doctor: &Doctor,
        start_at: DateTime<FixedOffset>,
        appt_type: &str,
        patient_name: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        let (appt_type, duration) = self.scheduling.durations.resolve(appt_type)?;
        let end_at = start_at + duration;

        let tz = resolve_timezone(None, Some(doctor.timezone.as_str()), self.scheduling.default_timezone)?;
        let local_date = start_at.with_timezone(&tz).date_naive();

        let Some(window) = doctor.working_hours.for_weekday(weekday_index(local_date)) else {
            warn!("Doctor {} not working on {}", doctor.id, local_date);
            return Err(SchedulingError::not_working());
        };

        let (window_start, window_end) = window.localize_on(local_date, tz);
        if !(window_start <= start_at && end_at <= window_end) {
            warn!(
                "Requested {} - {} outside working hours {} - {} for doctor {}",
                start_at, end_at, window_start, window_end, doctor.id
            );
            return Err(SchedulingError::outside_working_hours());
        }

        let _guard = self.booking_locks.acquire(doctor.id).await;

        let conflicts = self.conflict_service.check_conflicts(doctor.id, start_at, end_at).await?;
        if conflicts.has_conflict {
            return Err(SchedulingError::already_booked());
        }

        let now = now_in(tz);
        debug!("Inserting {} appointment for doctor {} at {}", appt_type, doctor.id, start_at);

        let appointment = self.store.insert_appointment(NewAppointment {
            doctor_id: doctor.id,
            appt_type,
            start_at: start_at.with_timezone(&Utc),
            end_at: end_at.with_timezone(&Utc),
            patient_name,
            created_at: now,
            updated_at: now,
        }).await?;

        info!("Created appointment ID: {}", appointment.id);
        Ok(appointment)
    }
}
