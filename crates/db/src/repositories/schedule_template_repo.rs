//! Repository for the `schedule_templates` table.

use presenca_core::types::DbId;
use sqlx::PgPool;

use crate::models::schedule_template::{CreateScheduleTemplate, ScheduleTemplateRow};

/// Column list for `schedule_templates` queries.
const COLUMNS: &str = "\
    id, is_active, weekday, start_time, end_time, unit, \
    level_id, capacity, created_at, updated_at";

/// Provides CRUD operations for weekly schedule templates.
pub struct ScheduleTemplateRepo;

impl ScheduleTemplateRepo {
    /// Insert a new active template, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScheduleTemplate,
    ) -> Result<ScheduleTemplateRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedule_templates \
                 (weekday, start_time, end_time, unit, level_id, capacity) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduleTemplateRow>(&query)
            .bind(input.weekday)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(&input.unit)
            .bind(input.level_id)
            .bind(input.capacity)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ScheduleTemplateRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedule_templates WHERE id = $1");
        sqlx::query_as::<_, ScheduleTemplateRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active templates ordered by weekday, start time, then id.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<ScheduleTemplateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM schedule_templates \
             WHERE is_active \
             ORDER BY weekday ASC, start_time ASC, id ASC"
        );
        sqlx::query_as::<_, ScheduleTemplateRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Activate or deactivate a template. Returns `true` if the row exists.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE schedule_templates SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
