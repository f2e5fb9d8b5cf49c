use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduling::localize;

/// One weekday's working hours as local wall-clock times, `start < end`.
///
/// Serialized as `["HH:MM", "HH:MM"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[String; 2]", into = "[String; 2]")]
pub struct WorkingWindow {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingHoursError(String);

impl fmt::Display for WorkingHoursError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for WorkingHoursError {}

fn parse_wall_time(raw: &str) -> Result<NaiveTime, WorkingHoursError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| WorkingHoursError(format!("Invalid time '{}', expected HH:MM", raw)))
}

impl WorkingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, WorkingHoursError> {
        if start >= end {
            return Err(WorkingHoursError(format!(
                "Working hours start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, WorkingHoursError> {
        Self::new(parse_wall_time(start)?, parse_wall_time(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// The window on `date` as instants in `tz`.
    pub fn localize_on(&self, date: NaiveDate, tz: Tz) -> (DateTime<Tz>, DateTime<Tz>) {
        (
            localize(tz, date.and_time(self.start)),
            localize(tz, date.and_time(self.end)),
        )
    }
}

impl TryFrom<[String; 2]> for WorkingWindow {
    type Error = WorkingHoursError;

    fn try_from([start, end]: [String; 2]) -> Result<Self, Self::Error> {
        Self::parse(&start, &end)
    }
}

impl From<WorkingWindow> for [String; 2] {
    fn from(window: WorkingWindow) -> Self {
        [
            window.start.format("%H:%M").to_string(),
            window.end.format("%H:%M").to_string(),
        ]
    }
}

/// Weekly working hours keyed by weekday, Monday = 0 .. Sunday = 6.
/// A missing weekday is a day off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u8, WorkingWindow>", into = "BTreeMap<u8, WorkingWindow>")]
pub struct WorkingHours(BTreeMap<u8, WorkingWindow>);

impl WorkingHours {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, weekday: u8, window: WorkingWindow) -> Result<Self, WorkingHoursError> {
        check_weekday(weekday)?;
        self.0.insert(weekday, window);
        Ok(self)
    }

    pub fn for_weekday(&self, weekday: u8) -> Option<&WorkingWindow> {
        self.0.get(&weekday)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &WorkingWindow)> {
        self.0.iter().map(|(day, window)| (*day, window))
    }
}

fn check_weekday(weekday: u8) -> Result<(), WorkingHoursError> {
    if weekday > 6 {
        return Err(WorkingHoursError(format!(
            "Weekday must be between 0 (Monday) and 6 (Sunday), got {}",
            weekday
        )));
    }
    Ok(())
}

impl TryFrom<BTreeMap<u8, WorkingWindow>> for WorkingHours {
    type Error = WorkingHoursError;

    fn try_from(days: BTreeMap<u8, WorkingWindow>) -> Result<Self, Self::Error> {
        for weekday in days.keys() {
            check_weekday(*weekday)?;
        }
        Ok(Self(days))
    }
}

impl From<WorkingHours> for BTreeMap<u8, WorkingWindow> {
    fn from(hours: WorkingHours) -> Self {
        hours.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    pub working_hours: WorkingHours,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// A doctor row as handed to the store; the store assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct NewDoctor {
    pub name: String,
    pub timezone: String,
    pub working_hours: WorkingHours,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}
