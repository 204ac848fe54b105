//! Weekly schedule template rows.

use chrono::NaiveTime;
use presenca_core::error::CoreError;
use presenca_core::template::{
    validate_capacity, validate_schedule_template, validate_weekday, ScheduleTemplate,
};
use presenca_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `schedule_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduleTemplateRow {
    pub id: DbId,
    pub is_active: bool,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub unit: String,
    pub level_id: Option<DbId>,
    pub capacity: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a schedule template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScheduleTemplate {
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub unit: String,
    pub level_id: Option<DbId>,
    pub capacity: Option<i32>,
}

impl TryFrom<ScheduleTemplateRow> for ScheduleTemplate {
    type Error = CoreError;

    fn try_from(row: ScheduleTemplateRow) -> Result<Self, Self::Error> {
        let template = ScheduleTemplate {
            id: row.id,
            active: row.is_active,
            weekday: validate_weekday(i64::from(row.weekday))?,
            start_time: row.start_time,
            end_time: row.end_time,
            unit: row.unit,
            level_id: row.level_id,
            capacity: validate_capacity(row.capacity.map(i64::from))?,
        };
        validate_schedule_template(&template)?;
        Ok(template)
    }
}
