//! PostgreSQL implementations of the `presenca_core::store` traits.

use std::collections::HashMap;

use async_trait::async_trait;
use presenca_core::error::CoreError;
use presenca_core::identity::InstanceKey;
use presenca_core::instance::ClassInstance;
use presenca_core::store::{InstanceStore, TemplateSource};
use presenca_core::template::{ScheduleTemplate, SpecialSession};
use presenca_core::window::DateWindow;

use crate::repositories::{ClassInstanceRepo, ScheduleTemplateRepo, SpecialSessionRepo};
use crate::DbPool;

fn store_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |err| {
        tracing::error!(error = %err, context, "Database error");
        CoreError::Store(format!("{context}: {err}"))
    }
}

/// Template store backed by `schedule_templates` and `special_sessions`.
#[derive(Clone)]
pub struct PgTemplateStore {
    pool: DbPool,
}

impl PgTemplateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateSource for PgTemplateStore {
    async fn active_weekly_templates(&self) -> Result<Vec<ScheduleTemplate>, CoreError> {
        ScheduleTemplateRepo::list_active(&self.pool)
            .await
            .map_err(store_error("loading schedule templates"))?
            .into_iter()
            .map(ScheduleTemplate::try_from)
            .collect()
    }

    async fn active_special_sessions(&self) -> Result<Vec<SpecialSession>, CoreError> {
        SpecialSessionRepo::list_active(&self.pool)
            .await
            .map_err(store_error("loading special sessions"))?
            .into_iter()
            .map(SpecialSession::try_from)
            .collect()
    }
}

/// Persisted instance set backed by `class_instances`.
#[derive(Clone)]
pub struct PgInstanceStore {
    pool: DbPool,
}

impl PgInstanceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstanceStore for PgInstanceStore {
    async fn load_persisted(
        &self,
        window: DateWindow,
    ) -> Result<HashMap<InstanceKey, ClassInstance>, CoreError> {
        let rows = ClassInstanceRepo::list_in_range(&self.pool, window.start, window.end())
            .await
            .map_err(store_error("loading class instances"))?;

        Ok(rows
            .into_iter()
            .map(ClassInstance::from)
            .map(|inst| (inst.identity, inst))
            .collect())
    }

    async fn find(&self, key: &InstanceKey) -> Result<Option<ClassInstance>, CoreError> {
        Ok(ClassInstanceRepo::find(&self.pool, key)
            .await
            .map_err(store_error("finding class instance"))?
            .map(ClassInstance::from))
    }

    async fn save(&self, instance: &ClassInstance) -> Result<(), CoreError> {
        ClassInstanceRepo::upsert(&self.pool, instance)
            .await
            .map_err(store_error("saving class instance"))?;
        Ok(())
    }

    async fn delete(&self, key: &InstanceKey) -> Result<bool, CoreError> {
        ClassInstanceRepo::delete(&self.pool, key)
            .await
            .map_err(store_error("deleting class instance"))
    }
}
