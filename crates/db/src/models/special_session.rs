//! Special (one-off) session rows.

use chrono::{NaiveDate, NaiveTime};
use presenca_core::error::CoreError;
use presenca_core::template::{validate_capacity, validate_special_session, SpecialSession};
use presenca_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `special_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SpecialSessionRow {
    pub id: DbId,
    pub is_active: bool,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub unit: String,
    pub level_id: Option<DbId>,
    pub capacity: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a special session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpecialSession {
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub unit: String,
    pub level_id: Option<DbId>,
    pub capacity: Option<i32>,
}

impl TryFrom<SpecialSessionRow> for SpecialSession {
    type Error = CoreError;

    fn try_from(row: SpecialSessionRow) -> Result<Self, Self::Error> {
        let session = SpecialSession {
            id: row.id,
            active: row.is_active,
            date: row.session_date,
            start_time: row.start_time,
            end_time: row.end_time,
            unit: row.unit,
            level_id: row.level_id,
            capacity: validate_capacity(row.capacity.map(i64::from))?,
        };
        validate_special_session(&session)?;
        Ok(session)
    }
}
