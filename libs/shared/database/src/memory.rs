use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::scheduling::day_span;
use shared_models::{Appointment, Doctor, NewAppointment, NewDoctor};

use crate::store::{SchedulingStore, StoreError};

#[derive(Default)]
struct Tables {
    doctors: Vec<Doctor>,
    appointments: HashMap<Uuid, Vec<Appointment>>,
}

/// Process-local [`SchedulingStore`]. Appointments per doctor are kept sorted
/// by start; the overlap check and the insert share one write lock.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn appointment_count(&self) -> usize {
        self.tables.read().await.appointments.values().map(Vec::len).sum()
    }

    async fn select_appointments<F>(&self, doctor_id: Uuid, keep: F) -> Vec<Appointment>
    where
        F: Fn(&Appointment) -> bool,
    {
        let tables = self.tables.read().await;
        tables
            .appointments
            .get(&doctor_id)
            .map(|booked| booked.iter().filter(|&appt| keep(appt)).cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.iter().find(|doctor| doctor.id == doctor_id).cloned())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        Ok(self.tables.read().await.doctors.clone())
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        let created = Doctor {
            id: Uuid::new_v4(),
            name: doctor.name,
            timezone: doctor.timezone,
            working_hours: doctor.working_hours,
            is_active: doctor.is_active,
            created_at: doctor.created_at,
            updated_at: doctor.updated_at,
        };

        self.tables.write().await.doctors.push(created.clone());
        info!("Created doctor id={} name={}", created.id, created.name);
        Ok(created)
    }

    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        Ok(self.select_appointments(doctor_id, |_| true).await)
    }

    async fn list_appointments_for_doctor_on_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<Vec<Appointment>, StoreError> {
        let (day_start, day_end) = day_span(date, tz)?;
        debug!("Fetching appointments for doctor {} between {} and {}", doctor_id, day_start, day_end);

        Ok(self
            .select_appointments(doctor_id, |appt| appt.start_at >= day_start && appt.start_at < day_end)
            .await)
    }

    async fn list_appointments_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        Ok(self.select_appointments(doctor_id, |appt| appt.overlaps(start, end)).await)
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.doctors.iter().any(|doctor| doctor.id == appointment.doctor_id) {
            return Err(StoreError::NotFound(format!("Doctor {} not found", appointment.doctor_id)));
        }

        let booked = tables.appointments.entry(appointment.doctor_id).or_default();
        if booked.iter().any(|existing| appointment.overlaps(existing)) {
            return Err(StoreError::Overlap);
        }

        let created = Appointment {
            id: Uuid::new_v4(),
            doctor_id: appointment.doctor_id,
            appt_type: appointment.appt_type,
            start_at: appointment.start_at,
            end_at: appointment.end_at,
            patient_name: appointment.patient_name,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        };

        let position = booked.partition_point(|existing| existing.start_at <= created.start_at);
        booked.insert(position, created.clone());

        info!("Created appointment id={} doctor={} start={}", created.id, created.doctor_id, created.start_at);
        Ok(created)
    }
}
