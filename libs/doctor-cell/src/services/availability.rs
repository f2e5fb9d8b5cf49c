use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use tracing::{debug, info};

use shared_database::{AppState, SchedulingStore};
use shared_models::scheduling::{intervals_overlap, resolve_timezone, weekday_index, SchedulingConfig};
use shared_models::{Doctor, SchedulingError};

pub struct AvailabilityService {
    store: Arc<dyn SchedulingStore>,
    scheduling: Arc<SchedulingConfig>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn SchedulingStore>, scheduling: Arc<SchedulingConfig>) -> Self {
        Self { store, scheduling }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.store), Arc::clone(&state.scheduling))
    }

    /// Free start instants for `appt_type` on `target_date`, ascending.
    ///
    /// The working window is localized in `requested_timezone`, falling back
    /// to the doctor's zone and then the configured default. A weekday with
    /// no working hours yields no slots.
    pub async fn compute_available_slots(
        &self,
        doctor: &Doctor,
        target_date: NaiveDate,
        appt_type: &str,
        requested_timezone: Option<&str>,
    ) -> Result<Vec<DateTime<Tz>>, SchedulingError> {
        let (appt_type, slot_length) = self.scheduling.durations.resolve(appt_type)?;

        let weekday = weekday_index(target_date);
        let Some(window) = doctor.working_hours.for_weekday(weekday) else {
            info!("No working hours for doctor {} on weekday {}", doctor.id, weekday);
            return Ok(vec![]);
        };

        let tz = resolve_timezone(
            requested_timezone,
            Some(doctor.timezone.as_str()),
            self.scheduling.default_timezone,
        )?;
        let (window_start, window_end) = window.localize_on(target_date, tz);

        let existing = self
            .store
            .list_appointments_for_doctor_on_date(doctor.id, target_date, tz)
            .await?;
        let booked: Vec<(DateTime<Tz>, DateTime<Tz>)> = existing
            .iter()
            .map(|appt| (appt.start_at.with_timezone(&tz), appt.end_at.with_timezone(&tz)))
            .collect();

        let slots = slot_grid(window_start, window_end, slot_length, &booked);
        debug!(
            "Found {} available {} slots for doctor {} on {} ({} booked)",
            slots.len(), appt_type, doctor.id, target_date, booked.len()
        );

        Ok(slots)
    }
}

/// Walks `[window_start, window_end)` in steps of `slot_length` and keeps
/// each candidate that overlaps none of `booked`. The grid is anchored at
/// `window_start`; a trailing partial slot is dropped.
pub fn slot_grid(
    window_start: DateTime<Tz>,
    window_end: DateTime<Tz>,
    slot_length: Duration,
    booked: &[(DateTime<Tz>, DateTime<Tz>)],
) -> Vec<DateTime<Tz>> {
    let mut slots = Vec::new();
    if slot_length <= Duration::zero() {
        return slots;
    }

    let mut cursor = window_start;
    while cursor + slot_length <= window_end {
        let candidate_end = cursor + slot_length;

        let has_conflict = booked
            .iter()
            .any(|(start, end)| intervals_overlap(cursor, candidate_end, *start, *end));

        if !has_conflict {
            slots.push(cursor);
        }

        cursor = candidate_end;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use shared_models::scheduling::localize;

    fn at(time: &str) -> DateTime<Tz> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        localize(chrono_tz::UTC, date.and_time(NaiveTime::parse_from_str(time, "%H:%M").unwrap()))
    }

    fn hhmm(slots: &[DateTime<Tz>]) -> Vec<String> {
        slots.iter().map(|slot| slot.format("%H:%M").to_string()).collect()
    }

    #[test]
    fn grid_covers_window_exactly() {
        let slots = slot_grid(at("09:00"), at("12:00"), Duration::minutes(30), &[]);
        assert_eq!(hhmm(&slots), ["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]);
    }

    #[test]
    fn trailing_partial_slot_is_dropped() {
        let slots = slot_grid(at("09:00"), at("10:00"), Duration::minutes(45), &[]);
        assert_eq!(hhmm(&slots), ["09:00"]);
    }

    #[test]
    fn grid_does_not_shift_around_bookings() {
        // A 15 minute booking at 09:40 knocks out the 09:30 slot only; the
        // grid is not realigned to the end of the booking.
        let booked = [(at("09:40"), at("09:55"))];
        let slots = slot_grid(at("09:00"), at("11:00"), Duration::minutes(30), &booked);
        assert_eq!(hhmm(&slots), ["09:00", "10:00", "10:30"]);
    }

    #[test]
    fn touching_bookings_leave_neighbours_free() {
        let booked = [(at("10:00"), at("10:30"))];
        let slots = slot_grid(at("09:00"), at("11:00"), Duration::minutes(30), &booked);
        assert_eq!(hhmm(&slots), ["09:00", "09:30", "10:30"]);
    }

    #[test]
    fn window_shorter_than_slot_is_empty() {
        let slots = slot_grid(at("09:00"), at("09:30"), Duration::minutes(60), &[]);
        assert!(slots.is_empty());
    }
}
