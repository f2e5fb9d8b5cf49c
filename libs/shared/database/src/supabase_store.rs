use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::scheduling::day_span;
use shared_models::{Appointment, Doctor, NewAppointment, NewDoctor};

use crate::store::{SchedulingStore, StoreError};
use crate::supabase::{SupabaseClient, SupabaseError};

/// [`SchedulingStore`] backed by the PostgREST API of a Supabase project.
///
/// Overlap rejection on insert relies on the exclusion constraint in
/// `database/schema.sql`; PostgREST reports its violation as HTTP 409.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

fn timestamp_param<Tz2: chrono::TimeZone>(instant: DateTime<Tz2>) -> String {
    urlencoding::encode(&instant.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::AutoSi, true)).into_owned()
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn fetch_appointments(&self, path: &str) -> Result<Vec<Appointment>, StoreError> {
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;
        decode_rows(result)
    }

    async fn insert_row<T: DeserializeOwned>(&self, table: &str, row: Value) -> Result<T, SupabaseError> {
        let path = format!("/rest/v1/{}", table);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(row),
            Some(representation_headers()),
        ).await?;

        let created = result
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::Decode(format!("Insert into {} returned no rows", table)))?;

        serde_json::from_value(created).map_err(|e| SupabaseError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SchedulingStore for SupabaseStore {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, StoreError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            "/rest/v1/doctors?order=created_at.asc",
            None,
        ).await?;
        decode_rows(result)
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor, StoreError> {
        let created: Doctor = self.insert_row("doctors", serde_json::to_value(&doctor)?).await?;
        info!("Created doctor id={} name={}", created.id, created.name);
        Ok(created)
    }

    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&order=start_at.asc",
            doctor_id
        );
        self.fetch_appointments(&path).await
    }

    async fn list_appointments_for_doctor_on_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<Vec<Appointment>, StoreError> {
        let (day_start, day_end) = day_span(date, tz)?;
        debug!("Fetching appointments for doctor {} between {} and {}", doctor_id, day_start, day_end);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&start_at=gte.{}&start_at=lt.{}&order=start_at.asc",
            doctor_id,
            timestamp_param(day_start),
            timestamp_param(day_end),
        );
        self.fetch_appointments(&path).await
    }

    async fn list_appointments_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&start_at=lt.{}&end_at=gt.{}&order=start_at.asc",
            doctor_id,
            timestamp_param(end),
            timestamp_param(start),
        );
        self.fetch_appointments(&path).await
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        info!("Creating appointment for doctor id={} at {}", appointment.doctor_id, appointment.start_at);
        // Only the appointments exclusion constraint turns a 409 into an overlap.
        let created: Appointment = self
            .insert_row("appointments", serde_json::to_value(&appointment)?)
            .await
            .map_err(|err| match err {
                SupabaseError::Conflict(_) => StoreError::Overlap,
                other => StoreError::from(other),
            })?;
        info!("Created appointment id={} doctor={} start={}", created.id, created.doctor_id, created.start_at);
        Ok(created)
    }
}
