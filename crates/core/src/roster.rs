//! Roster service: the library contract consumed by the presentation layer.
//!
//! Reads compose projection and reconciliation over the rolling window.
//! Mutations resolve the target instance (persisted snapshot first, fresh
//! projection otherwise), apply one state-machine operation and write the
//! result back, so an instance materializes on its first successful
//! mutation only. A failed operation never touches the store.
//!
//! Mutations on one identity are serialized in-process: the
//! find-apply-save cycle runs under a per-identity lock, so concurrent
//! callers never overwrite each other's snapshot.
//!
//! Materialized instances are frozen: later template edits (time,
//! capacity) do not propagate to them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::checkin;
use crate::error::CoreError;
use crate::identity::InstanceKey;
use crate::instance::ClassInstance;
use crate::merger::{instances_for_date, reconcile};
use crate::projector::{project_occurrence, ProjectionCache};
use crate::store::{InstanceStore, TemplateSource};
use crate::types::{DbId, Timestamp};
use crate::window::{DateWindow, DEFAULT_WINDOW_DAYS};

/// Roster tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterConfig {
    /// Number of days projected ahead of today (default: `30`).
    pub window_days: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

/// Per-identity async locks. Entries nobody holds are pruned on the next
/// acquisition.
#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<InstanceKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyLocks {
    fn lock_for(&self, key: &InstanceKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(*key).or_default())
    }
}

pub struct Roster<T, S> {
    templates: T,
    store: S,
    config: RosterConfig,
    cache: ProjectionCache,
    writers: KeyLocks,
}

impl<T: TemplateSource, S: InstanceStore> Roster<T, S> {
    pub fn new(templates: T, store: S, config: RosterConfig) -> Self {
        Self {
            templates,
            store,
            config,
            cache: ProjectionCache::new(),
            writers: KeyLocks::default(),
        }
    }

    pub fn config(&self) -> RosterConfig {
        self.config
    }

    pub fn templates(&self) -> &T {
        &self.templates
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The rolling window starting at `today`.
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        DateWindow::new(today, self.config.window_days)
    }

    async fn projected(&self, window: DateWindow) -> Result<Arc<Vec<ClassInstance>>, CoreError> {
        let templates = self.templates.active_weekly_templates().await?;
        let sessions = self.templates.active_special_sessions().await?;
        Ok(self.cache.get_or_project(&templates, &sessions, window))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Every authoritative instance in the window starting at `today`.
    pub async fn instances_for_window(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<ClassInstance>, CoreError> {
        let window = self.window(today);
        let projected = self.projected(window).await?;
        let persisted = self.store.load_persisted(window).await?;
        Ok(reconcile(&projected, &persisted))
    }

    /// The roster for `date`, ordered by start time.
    ///
    /// Dates outside the window starting at `today` only show instances that
    /// were already materialized.
    pub async fn instances_for_date(
        &self,
        today: NaiveDate,
        date: NaiveDate,
    ) -> Result<Vec<ClassInstance>, CoreError> {
        let window = self.window(today);
        let projected: Vec<ClassInstance> = if window.contains(date) {
            self.projected(window)
                .await?
                .iter()
                .filter(|i| i.date == date)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        let persisted = self.store.load_persisted(DateWindow::single(date)).await?;

        let day = instances_for_date(&reconcile(&projected, &persisted), date);
        tracing::debug!(%date, instances = day.len(), "Built roster for date");
        Ok(day)
    }

    /// Resolve one instance: the persisted snapshot if any, else its projection.
    pub async fn instance(&self, key: &InstanceKey) -> Result<ClassInstance, CoreError> {
        if let Some(stored) = self.store.find(key).await? {
            return Ok(stored);
        }

        let templates = self.templates.active_weekly_templates().await?;
        let sessions = self.templates.active_special_sessions().await?;
        project_occurrence(key, &templates, &sessions).ok_or_else(|| CoreError::NotFound {
            entity: "ClassInstance",
            id: key.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    async fn mutate<F, R>(&self, key: &InstanceKey, op: F) -> Result<(ClassInstance, R), CoreError>
    where
        F: FnOnce(&mut ClassInstance, Timestamp) -> Result<R, CoreError> + Send,
        R: Send,
    {
        let lock = self.writers.lock_for(key);
        let _writer = lock.lock().await;

        let mut instance = self.instance(key).await?;
        let first_write = !instance.is_materialized();
        let now = Utc::now();

        let outcome = op(&mut instance, now)?;
        instance.touch(now);
        self.store.save(&instance).await?;

        if first_write {
            tracing::info!(identity = %key, "Materialized class instance");
        }
        Ok((instance, outcome))
    }

    /// Add a pre-check-in and return the updated instance with the new
    /// entry's id.
    pub async fn add_pre_checkin(
        &self,
        key: &InstanceKey,
        student_id: DbId,
        student_name: &str,
    ) -> Result<(ClassInstance, Uuid), CoreError> {
        let (instance, checkin_id) = self
            .mutate(key, |inst, now| {
                checkin::add_pre_checkin(inst, student_id, student_name, now)
            })
            .await?;
        tracing::info!(
            identity = %key,
            student_id,
            %checkin_id,
            occupied = checkin::occupied(&instance),
            "Pre-check-in added",
        );
        Ok((instance, checkin_id))
    }

    pub async fn cancel_pre_checkin(
        &self,
        key: &InstanceKey,
        checkin_id: Uuid,
    ) -> Result<ClassInstance, CoreError> {
        let (instance, ()) = self
            .mutate(key, |inst, _| checkin::cancel_pre_checkin(inst, checkin_id))
            .await?;
        tracing::info!(identity = %key, %checkin_id, "Pre-check-in cancelled");
        Ok(instance)
    }

    pub async fn confirm_attendance(
        &self,
        key: &InstanceKey,
        student_id: DbId,
        present: bool,
    ) -> Result<ClassInstance, CoreError> {
        let (instance, ()) = self
            .mutate(key, |inst, now| {
                checkin::confirm_attendance(inst, student_id, present, now)
            })
            .await?;
        tracing::info!(identity = %key, student_id, present, "Attendance confirmed");
        Ok(instance)
    }

    pub async fn confirm_presence(&self, key: &InstanceKey) -> Result<ClassInstance, CoreError> {
        let (instance, ()) = self
            .mutate(key, |inst, _| checkin::confirm_presence(inst))
            .await?;
        tracing::info!(identity = %key, "Presence list confirmed");
        Ok(instance)
    }

    pub async fn close(&self, key: &InstanceKey) -> Result<ClassInstance, CoreError> {
        let (instance, ()) = self.mutate(key, |inst, _| checkin::close(inst)).await?;
        tracing::info!(identity = %key, "Class closed");
        Ok(instance)
    }

    /// Delete a materialized instance so the occurrence reverts to its
    /// projection. Returns `false` if it was never materialized.
    pub async fn reset_instance(&self, key: &InstanceKey) -> Result<bool, CoreError> {
        let lock = self.writers.lock_for(key);
        let _writer = lock.lock().await;

        let removed = self.store.delete(key).await?;
        if removed {
            tracing::info!(identity = %key, "Materialized instance deleted");
        }
        Ok(removed)
    }
}
