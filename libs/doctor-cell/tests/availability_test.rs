use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::json;

use doctor_cell::models::CreateDoctorRequest;
use doctor_cell::services::{AvailabilityService, DoctorService};
use shared_database::{InMemoryStore, SchedulingStore};
use shared_models::scheduling::SchedulingConfig;
use shared_models::{AppointmentType, Doctor, DurationTable, NewAppointment, SchedulingError};

// ==============================================================================
// TEST FIXTURES
// ==============================================================================

// 2024-01-15 is a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

struct TestSetup {
    store: Arc<InMemoryStore>,
    scheduling: Arc<SchedulingConfig>,
}

impl TestSetup {
    fn new() -> Self {
        Self::with_scheduling(SchedulingConfig::default())
    }

    fn with_scheduling(scheduling: SchedulingConfig) -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            scheduling: Arc::new(scheduling),
        }
    }

    fn availability(&self) -> AvailabilityService {
        AvailabilityService::new(self.store.clone(), self.scheduling.clone())
    }

    async fn doctor(&self, timezone: &str, working_hours: serde_json::Value) -> Doctor {
        DoctorService::new(self.store.clone(), self.scheduling.clone())
            .create_doctor(CreateDoctorRequest {
                name: "Dr. Iyer".to_string(),
                timezone: Some(timezone.to_string()),
                working_hours: serde_json::from_value(working_hours).unwrap(),
            })
            .await
            .unwrap()
    }

    async fn book(&self, doctor: &Doctor, start: DateTime<Utc>, appt_type: AppointmentType) {
        let length = self.scheduling.durations.duration_for(appt_type).unwrap();
        let now = Utc::now().fixed_offset();
        self.store
            .insert_appointment(NewAppointment {
                doctor_id: doctor.id,
                appt_type,
                start_at: start,
                end_at: start + length,
                patient_name: Some("Ravi".to_string()),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }
}

fn local_hhmm(slots: &[DateTime<Tz>]) -> Vec<String> {
    slots.iter().map(|slot| slot.format("%H:%M").to_string()).collect()
}

// ==============================================================================
// SLOT COMPUTATION
// ==============================================================================

#[tokio::test]
async fn morning_shift_yields_six_general_slots() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Asia/Kolkata", json!({"0": ["09:00", "12:00"]})).await;

    let slots = setup
        .availability()
        .compute_available_slots(&doctor, monday(), "general", None)
        .await
        .unwrap();

    assert_eq!(local_hhmm(&slots), ["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]);
    assert_eq!(slots[0].to_rfc3339(), "2024-01-15T09:00:00+05:30");
}

#[tokio::test]
async fn booked_slot_is_removed() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Asia/Kolkata", json!({"0": ["09:00", "12:00"]})).await;

    // 10:00 IST
    setup.book(&doctor, Utc.with_ymd_and_hms(2024, 1, 15, 4, 30, 0).unwrap(), AppointmentType::General).await;

    let slots = setup
        .availability()
        .compute_available_slots(&doctor, monday(), "general", None)
        .await
        .unwrap();

    assert_eq!(local_hhmm(&slots), ["09:00", "09:30", "10:30", "11:00", "11:30"]);
}

#[tokio::test]
async fn day_off_yields_no_slots() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Asia/Kolkata", json!({"0": ["09:00", "12:00"]})).await;
    let tuesday = monday() + Duration::days(1);

    let slots = setup
        .availability()
        .compute_available_slots(&doctor, tuesday, "general", None)
        .await
        .unwrap();

    assert!(slots.is_empty());
}

#[tokio::test]
async fn empty_working_hours_never_has_slots() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Asia/Kolkata", json!({})).await;
    let service = setup.availability();

    for offset in 0..7 {
        let slots = service
            .compute_available_slots(&doctor, monday() + Duration::days(offset), "specialist", None)
            .await
            .unwrap();
        assert!(slots.is_empty());
    }
}

#[tokio::test]
async fn unknown_type_is_invalid_argument() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Asia/Kolkata", json!({"0": ["09:00", "12:00"]})).await;

    let result = setup
        .availability()
        .compute_available_slots(&doctor, monday(), "dental", None)
        .await;

    assert_matches!(result, Err(SchedulingError::InvalidArgument(_)));
}

#[tokio::test]
async fn unknown_requested_timezone_is_invalid_argument() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Asia/Kolkata", json!({"0": ["09:00", "12:00"]})).await;

    let result = setup
        .availability()
        .compute_available_slots(&doctor, monday(), "general", Some("Nowhere/Special"))
        .await;

    assert_matches!(result, Err(SchedulingError::InvalidArgument(_)));
}

// ==============================================================================
// INVARIANTS OVER RETURNED SLOTS
// ==============================================================================

#[tokio::test]
async fn slots_are_evenly_spaced_and_inside_window() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Europe/Berlin", json!({"0": ["08:15", "17:50"]})).await;
    setup.book(&doctor, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(), AppointmentType::Specialist).await;

    let service = setup.availability();
    for appt_type in AppointmentType::ALL {
        let length = setup.scheduling.durations.duration_for(appt_type).unwrap();
        let slots = service
            .compute_available_slots(&doctor, monday(), appt_type.as_str(), None)
            .await
            .unwrap();

        assert!(!slots.is_empty());
        let window_start = Utc.with_ymd_and_hms(2024, 1, 15, 7, 15, 0).unwrap();
        let window_end = Utc.with_ymd_and_hms(2024, 1, 15, 16, 50, 0).unwrap();

        for slot in &slots {
            let slot = slot.with_timezone(&Utc);
            assert!(slot >= window_start);
            assert!(slot + length <= window_end);
            assert_eq!((slot - window_start).num_minutes() % length.num_minutes(), 0);
        }
        for pair in slots.windows(2) {
            assert!(pair[1] - pair[0] >= length);
            assert_eq!((pair[1] - pair[0]).num_minutes() % length.num_minutes(), 0);
        }
    }
}

#[tokio::test]
async fn consecutive_free_slots_are_one_duration_apart() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("UTC", json!({"0": ["09:00", "13:00"]})).await;

    let slots = setup
        .availability()
        .compute_available_slots(&doctor, monday(), "physical", None)
        .await
        .unwrap();

    assert_eq!(local_hhmm(&slots), ["09:00", "09:45", "10:30", "11:15", "12:00"]);
    for pair in slots.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::minutes(45));
    }
}

#[tokio::test]
async fn repeated_queries_are_identical() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Asia/Kolkata", json!({"0": ["09:00", "12:00"]})).await;
    setup.book(&doctor, Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap(), AppointmentType::FollowUp).await;

    let service = setup.availability();
    let first = service.compute_available_slots(&doctor, monday(), "follow_up", None).await.unwrap();
    let second = service.compute_available_slots(&doctor, monday(), "follow_up", None).await.unwrap();

    assert_eq!(first, second);
}

// ==============================================================================
// TIMEZONES
// ==============================================================================

#[tokio::test]
async fn requested_timezone_overrides_doctor_zone() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("Asia/Kolkata", json!({"0": ["09:00", "10:00"]})).await;

    let slots = setup
        .availability()
        .compute_available_slots(&doctor, monday(), "general", Some("Europe/London"))
        .await
        .unwrap();

    assert_eq!(
        slots.iter().map(|slot| slot.to_rfc3339()).collect::<Vec<_>>(),
        ["2024-01-15T09:00:00+00:00", "2024-01-15T09:30:00+00:00"]
    );
}

#[tokio::test]
async fn bookings_are_compared_as_instants() {
    let setup = TestSetup::new();
    let doctor = setup.doctor("America/New_York", json!({"0": ["09:00", "11:00"]})).await;

    // 09:30 in New York, stored in UTC.
    setup.book(&doctor, Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap(), AppointmentType::General).await;

    let slots = setup
        .availability()
        .compute_available_slots(&doctor, monday(), "general", None)
        .await
        .unwrap();

    assert_eq!(local_hhmm(&slots), ["09:00", "10:00", "10:30"]);
}

#[tokio::test]
async fn default_timezone_applies_when_doctor_zone_blank() {
    let setup = TestSetup::with_scheduling(
        SchedulingConfig::new(DurationTable::default(), "Europe/Paris").unwrap(),
    );
    let mut doctor = setup.doctor("UTC", json!({"0": ["09:00", "09:30"]})).await;
    doctor.timezone = String::new();

    let slots = setup
        .availability()
        .compute_available_slots(&doctor, monday(), "general", None)
        .await
        .unwrap();

    assert_eq!(slots[0].to_rfc3339(), "2024-01-15T09:00:00+01:00");
}

#[tokio::test]
async fn custom_duration_table_drives_slot_length() {
    let durations = DurationTable::from_minutes([(AppointmentType::General, 20)]).unwrap();
    let setup = TestSetup::with_scheduling(SchedulingConfig::new(durations, "UTC").unwrap());
    let doctor = setup.doctor("UTC", json!({"0": ["09:00", "10:00"]})).await;
    let service = setup.availability();

    let slots = service.compute_available_slots(&doctor, monday(), "general", None).await.unwrap();
    assert_eq!(local_hhmm(&slots), ["09:00", "09:20", "09:40"]);

    let result = service.compute_available_slots(&doctor, monday(), "specialist", None).await;
    assert_matches!(result, Err(SchedulingError::InvalidArgument(_)));
}
