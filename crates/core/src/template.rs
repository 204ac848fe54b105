//! Class templates: weekly schedule slots and one-off special sessions.
//!
//! Both are read-only inputs to the projector. Weekdays use the
//! Sunday-first numbering `0 = Sunday .. 6 = Saturday`.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Highest valid weekday number (Saturday).
pub const MAX_WEEKDAY: u8 = 6;

/// Maximum length of a unit name.
const MAX_UNIT_LEN: usize = 120;

/// Weekday number of `date` in the `0 = Sunday` convention.
pub fn weekday_of(date: NaiveDate) -> u8 {
    // num_days_from_sunday() is always in 0..=6.
    date.weekday().num_days_from_sunday() as u8
}

/// A weekly recurring class slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTemplate {
    pub id: DbId,
    pub active: bool,
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub unit: String,
    pub level_id: Option<DbId>,
    /// `None` means unlimited.
    pub capacity: Option<u32>,
}

impl ScheduleTemplate {
    /// Whether this slot recurs on `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.active && self.weekday == weekday_of(date)
    }
}

/// A one-off class on an exact calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSession {
    pub id: DbId,
    pub active: bool,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub unit: String,
    pub level_id: Option<DbId>,
    pub capacity: Option<u32>,
}

impl SpecialSession {
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.active && self.date == date
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a weekday number.
pub fn validate_weekday(weekday: i64) -> Result<u8, CoreError> {
    u8::try_from(weekday)
        .ok()
        .filter(|w| *w <= MAX_WEEKDAY)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid weekday {weekday}. Must be between 0 (Sunday) and {MAX_WEEKDAY} (Saturday)"
            ))
        })
}

/// Validate an optional capacity coming from storage or user input.
///
/// A capacity of zero would make the class impossible to join, so it is
/// rejected; absent means unlimited.
pub fn validate_capacity(capacity: Option<i64>) -> Result<Option<u32>, CoreError> {
    match capacity {
        None => Ok(None),
        Some(c) if c >= 1 => u32::try_from(c)
            .map(Some)
            .map_err(|_| CoreError::Validation(format!("Capacity {c} is too large"))),
        Some(c) => Err(CoreError::Validation(format!(
            "Capacity must be at least 1, got {c}"
        ))),
    }
}

/// Shared time-range and unit checks.
fn validate_slot(start: NaiveTime, end: NaiveTime, unit: &str) -> Result<(), CoreError> {
    if start >= end {
        return Err(CoreError::Validation(format!(
            "Start time {start} must be before end time {end}"
        )));
    }
    let unit = unit.trim();
    if unit.is_empty() {
        return Err(CoreError::Validation("Unit must not be empty".to_string()));
    }
    if unit.len() > MAX_UNIT_LEN {
        return Err(CoreError::Validation(format!(
            "Unit must not exceed {MAX_UNIT_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a weekly schedule template.
pub fn validate_schedule_template(template: &ScheduleTemplate) -> Result<(), CoreError> {
    validate_weekday(i64::from(template.weekday))?;
    validate_slot(template.start_time, template.end_time, &template.unit)?;
    if template.capacity == Some(0) {
        return Err(CoreError::Validation(
            "Capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Validate a special session.
pub fn validate_special_session(session: &SpecialSession) -> Result<(), CoreError> {
    validate_slot(session.start_time, session.end_time, &session.unit)?;
    if session.capacity == Some(0) {
        return Err(CoreError::Validation(
            "Capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}
