//! Repository for the `special_sessions` table.

use presenca_core::types::DbId;
use sqlx::PgPool;

use crate::models::special_session::{CreateSpecialSession, SpecialSessionRow};

/// Column list for `special_sessions` queries.
const COLUMNS: &str = "\
    id, is_active, session_date, start_time, end_time, unit, \
    level_id, capacity, created_at, updated_at";

/// Provides CRUD operations for one-off special sessions.
pub struct SpecialSessionRepo;

impl SpecialSessionRepo {
    /// Insert a new active session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSpecialSession,
    ) -> Result<SpecialSessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO special_sessions \
                 (session_date, start_time, end_time, unit, level_id, capacity) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SpecialSessionRow>(&query)
            .bind(input.session_date)
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
    ) -> Result<Option<SpecialSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM special_sessions WHERE id = $1");
        sqlx::query_as::<_, SpecialSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active sessions ordered by date, start time, then id.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<SpecialSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM special_sessions \
             WHERE is_active \
             ORDER BY session_date ASC, start_time ASC, id ASC"
        );
        sqlx::query_as::<_, SpecialSessionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Activate or deactivate a session. Returns `true` if the row exists.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE special_sessions SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
