use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

// ==============================================================================
// APPOINTMENT TYPES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    General,
    FollowUp,
    Physical,
    Specialist,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 4] = [
        AppointmentType::General,
        AppointmentType::FollowUp,
        AppointmentType::Physical,
        AppointmentType::Specialist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::General => "general",
            AppointmentType::FollowUp => "follow_up",
            AppointmentType::Physical => "physical",
            AppointmentType::Specialist => "specialist",
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentType {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentType::ALL
            .into_iter()
            .find(|appt_type| appt_type.as_str() == s)
            .ok_or_else(|| SchedulingError::InvalidArgument("Unknown appointment type".to_string()))
    }
}

// ==============================================================================
// DURATION TABLE
// ==============================================================================

/// Slot length per appointment type. Shared by the availability calculator
/// and the booking validator so the two never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationTable {
    durations: HashMap<AppointmentType, Duration>,
}

impl Default for DurationTable {
    fn default() -> Self {
        Self {
            durations: HashMap::from([
                (AppointmentType::General, Duration::minutes(30)),
                (AppointmentType::FollowUp, Duration::minutes(15)),
                (AppointmentType::Physical, Duration::minutes(45)),
                (AppointmentType::Specialist, Duration::minutes(60)),
            ]),
        }
    }
}

impl DurationTable {
    /// Builds a table from minute values. Every duration must be positive.
    pub fn from_minutes<I>(entries: I) -> Result<Self, SchedulingError>
    where
        I: IntoIterator<Item = (AppointmentType, i64)>,
    {
        let mut durations = HashMap::new();
        for (appt_type, minutes) in entries {
            if minutes <= 0 {
                return Err(SchedulingError::InvalidArgument(format!(
                    "Duration for {} must be positive, got {} minutes",
                    appt_type, minutes
                )));
            }
            durations.insert(appt_type, Duration::minutes(minutes));
        }
        Ok(Self { durations })
    }

    pub fn duration_for(&self, appt_type: AppointmentType) -> Option<Duration> {
        self.durations.get(&appt_type).copied()
    }

    /// Parses a raw type name and looks up its duration. Names outside the
    /// enumeration, or missing from this table, are `InvalidArgument`.
    pub fn resolve(&self, raw_type: &str) -> Result<(AppointmentType, Duration), SchedulingError> {
        let appt_type = AppointmentType::from_str(raw_type)?;
        let duration = self
            .duration_for(appt_type)
            .ok_or_else(|| SchedulingError::InvalidArgument("Unknown appointment type".to_string()))?;
        Ok((appt_type, duration))
    }
}

#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub durations: DurationTable,
    pub default_timezone: Tz,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            durations: DurationTable::default(),
            default_timezone: DEFAULT_TIMEZONE,
        }
    }
}

impl SchedulingConfig {
    pub fn new(durations: DurationTable, default_timezone: &str) -> Result<Self, SchedulingError> {
        Ok(Self {
            durations,
            default_timezone: parse_timezone(default_timezone)?,
        })
    }
}

// ==============================================================================
// TIMEZONES
// ==============================================================================

pub fn parse_timezone(name: &str) -> Result<Tz, SchedulingError> {
    name.parse::<Tz>()
        .map_err(|_| SchedulingError::InvalidArgument(format!("Unknown timezone: {}", name)))
}

/// Picks the timezone for a request.
///
/// Precedence: the caller's override, then the doctor's configured zone, then
/// `default`. Empty strings count as absent. A present but unknown name is an
/// error rather than a silent fall-through.
pub fn resolve_timezone(
    requested: Option<&str>,
    doctor_timezone: Option<&str>,
    default: Tz,
) -> Result<Tz, SchedulingError> {
    match requested
        .filter(|name| !name.is_empty())
        .or_else(|| doctor_timezone.filter(|name| !name.is_empty()))
    {
        Some(name) => parse_timezone(name),
        None => Ok(default),
    }
}

/// Attaches `tz` to a wall-clock time.
///
/// Ambiguous times (clocks turned back) take the earlier instant. Times that
/// fall in a gap (clocks turned forward) move to the first valid minute after
/// the gap.
pub fn localize(tz: Tz, local: NaiveDateTime) -> DateTime<Tz> {
    if let Some(instant) = tz.from_local_datetime(&local).earliest() {
        return instant;
    }
    // Gaps are at most a few hours in the tz database.
    let mut probe = local;
    for _ in 0..(24 * 60) {
        probe += Duration::minutes(1);
        if let Some(instant) = tz.from_local_datetime(&probe).earliest() {
            return instant;
        }
    }
    tz.from_utc_datetime(&local)
}

/// The instants bounding `date` as a calendar day in `tz`, half-open.
pub fn day_span(date: NaiveDate, tz: Tz) -> Result<(DateTime<Tz>, DateTime<Tz>), SchedulingError> {
    let next = date
        .succ_opt()
        .ok_or_else(|| SchedulingError::InvalidArgument(format!("Date out of range: {}", date)))?;
    let start = localize(tz, date.and_time(chrono::NaiveTime::MIN));
    let end = localize(tz, next.and_time(chrono::NaiveTime::MIN));
    Ok((start, end))
}

/// Monday = 0 .. Sunday = 6.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// Half-open overlap: `[a_start, a_end)` and `[b_start, b_end)` share an
/// instant. Touching endpoints do not overlap.
pub fn intervals_overlap<A, B>(
    a_start: DateTime<A>,
    a_end: DateTime<A>,
    b_start: DateTime<B>,
    b_end: DateTime<B>,
) -> bool
where
    A: TimeZone,
    B: TimeZone,
{
    a_start < b_end && b_start < a_end
}
