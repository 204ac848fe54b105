//! Materialized class instance rows.
//!
//! The full [`ClassInstance`] is stored as a JSONB snapshot keyed by its
//! canonical identity text; `class_date` is denormalized for range scans.

use chrono::NaiveDate;
use presenca_core::instance::ClassInstance;
use presenca_core::types::Timestamp;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `class_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassInstanceRow {
    pub identity: String,
    pub class_date: NaiveDate,
    pub snapshot: Json<ClassInstance>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ClassInstanceRow> for ClassInstance {
    fn from(row: ClassInstanceRow) -> Self {
        row.snapshot.0
    }
}
