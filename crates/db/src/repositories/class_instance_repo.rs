//! Repository for the `class_instances` table (the persisted instance set).
//!
//! Rows are full-record snapshots keyed by the canonical identity text.
//! Writes are upserts: the last save replaces the prior snapshot.

use chrono::NaiveDate;
use presenca_core::identity::InstanceKey;
use presenca_core::instance::ClassInstance;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::class_instance::ClassInstanceRow;

/// Column list for `class_instances` queries.
const COLUMNS: &str = "identity, class_date, snapshot, created_at, updated_at";

/// Provides upsert/lookup/delete for materialized class instances.
pub struct ClassInstanceRepo;

impl ClassInstanceRepo {
    /// Insert or fully replace the snapshot for `instance.identity`.
    pub async fn upsert(
        pool: &PgPool,
        instance: &ClassInstance,
    ) -> Result<ClassInstanceRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO class_instances (identity, class_date, snapshot) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (identity) DO UPDATE SET \
                 class_date = EXCLUDED.class_date, \
                 snapshot   = EXCLUDED.snapshot, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassInstanceRow>(&query)
            .bind(instance.identity.to_string())
            .bind(instance.date)
            .bind(Json(instance))
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        key: &InstanceKey,
    ) -> Result<Option<ClassInstanceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM class_instances WHERE identity = $1");
        sqlx::query_as::<_, ClassInstanceRow>(&query)
            .bind(key.to_string())
            .fetch_optional(pool)
            .await
    }

    /// List snapshots with `start <= class_date < end`, ordered by date then identity.
    pub async fn list_in_range(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClassInstanceRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM class_instances \
             WHERE class_date >= $1 AND class_date < $2 \
             ORDER BY class_date ASC, identity ASC"
        );
        sqlx::query_as::<_, ClassInstanceRow>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// Delete a snapshot. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, key: &InstanceKey) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM class_instances WHERE identity = $1")
            .bind(key.to_string())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
