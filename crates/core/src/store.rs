//! Storage seams consumed by the roster service.
//!
//! [`TemplateSource`] is the read-only template store; [`InstanceStore`] is
//! the persisted instance set, a key-value store from identity to the last
//! saved snapshot. In-memory implementations of both are provided for
//! embedding and tests; `presenca-db` provides PostgreSQL ones.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::identity::InstanceKey;
use crate::instance::ClassInstance;
use crate::template::{ScheduleTemplate, SpecialSession};
use crate::window::DateWindow;

#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn active_weekly_templates(&self) -> Result<Vec<ScheduleTemplate>, CoreError>;

    async fn active_special_sessions(&self) -> Result<Vec<SpecialSession>, CoreError>;
}

#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Every persisted instance whose date falls inside `window`.
    async fn load_persisted(
        &self,
        window: DateWindow,
    ) -> Result<HashMap<InstanceKey, ClassInstance>, CoreError>;

    async fn find(&self, key: &InstanceKey) -> Result<Option<ClassInstance>, CoreError>;

    /// Upsert with full-record replace.
    async fn save(&self, instance: &ClassInstance) -> Result<(), CoreError>;

    /// Remove a persisted instance. Returns `false` if nothing was stored.
    async fn delete(&self, key: &InstanceKey) -> Result<bool, CoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// Template store held in memory.
#[derive(Default)]
pub struct InMemoryTemplates {
    templates: RwLock<Vec<ScheduleTemplate>>,
    sessions: RwLock<Vec<SpecialSession>>,
}

impl InMemoryTemplates {
    pub fn new(templates: Vec<ScheduleTemplate>, sessions: Vec<SpecialSession>) -> Self {
        Self {
            templates: RwLock::new(templates),
            sessions: RwLock::new(sessions),
        }
    }

    /// Insert or replace a weekly template by id.
    pub async fn put_template(&self, template: ScheduleTemplate) {
        let mut templates = self.templates.write().await;
        match templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template,
            None => templates.push(template),
        }
    }

    /// Insert or replace a special session by id.
    pub async fn put_session(&self, session: SpecialSession) {
        let mut sessions = self.sessions.write().await;
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session,
            None => sessions.push(session),
        }
    }
}

#[async_trait]
impl TemplateSource for InMemoryTemplates {
    async fn active_weekly_templates(&self) -> Result<Vec<ScheduleTemplate>, CoreError> {
        Ok(self
            .templates
            .read()
            .await
            .iter()
            .filter(|t| t.active)
            .cloned()
            .collect())
    }

    async fn active_special_sessions(&self) -> Result<Vec<SpecialSession>, CoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect())
    }
}

/// Persisted instance set held in memory.
#[derive(Default)]
pub struct InMemoryInstanceStore {
    instances: RwLock<HashMap<InstanceKey, ClassInstance>>,
}

impl InMemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.instances.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.instances.read().await.is_empty()
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn load_persisted(
        &self,
        window: DateWindow,
    ) -> Result<HashMap<InstanceKey, ClassInstance>, CoreError> {
        Ok(self
            .instances
            .read()
            .await
            .iter()
            .filter(|(key, _)| window.contains(key.date))
            .map(|(key, inst)| (*key, inst.clone()))
            .collect())
    }

    async fn find(&self, key: &InstanceKey) -> Result<Option<ClassInstance>, CoreError> {
        Ok(self.instances.read().await.get(key).cloned())
    }

    async fn save(&self, instance: &ClassInstance) -> Result<(), CoreError> {
        self.instances
            .write()
            .await
            .insert(instance.identity, instance.clone());
        Ok(())
    }

    async fn delete(&self, key: &InstanceKey) -> Result<bool, CoreError> {
        Ok(self.instances.write().await.remove(key).is_some())
    }
}
