//! List projector: expands templates into concrete class instances.
//!
//! Projection is a pure function of `(templates, sessions, window)`. The
//! [`ProjectionCache`] memoizes the last result under a content fingerprint
//! of those inputs, so a template edit always yields a fresh projection.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::identity::{derive_identity, InstanceKey, InstanceKind};
use crate::instance::{ClassInstance, InstanceStatus};
use crate::template::{ScheduleTemplate, SpecialSession};
use crate::window::DateWindow;

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn from_template(template: &ScheduleTemplate, date: NaiveDate) -> ClassInstance {
    ClassInstance {
        identity: derive_identity(InstanceKind::Regular, template.id, date),
        date,
        start_time: template.start_time,
        end_time: template.end_time,
        unit: template.unit.clone(),
        level_id: template.level_id,
        capacity: template.capacity,
        status: InstanceStatus::Open,
        pre_checkins: Vec::new(),
        confirmed_attendance: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

fn from_session(session: &SpecialSession) -> ClassInstance {
    ClassInstance {
        identity: derive_identity(InstanceKind::Special, session.id, session.date),
        date: session.date,
        start_time: session.start_time,
        end_time: session.end_time,
        unit: session.unit.clone(),
        level_id: session.level_id,
        capacity: session.capacity,
        status: InstanceStatus::Open,
        pre_checkins: Vec::new(),
        confirmed_attendance: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

/// Project every active template and session over `window`.
///
/// Output is ordered by date; within a date, regular instances come first in
/// template input order, followed by special instances in session input
/// order. Inactive inputs are skipped.
pub fn project(
    templates: &[ScheduleTemplate],
    sessions: &[SpecialSession],
    window: DateWindow,
) -> Vec<ClassInstance> {
    let mut instances = Vec::new();

    for date in window.dates() {
        instances.extend(
            templates
                .iter()
                .filter(|t| t.occurs_on(date))
                .map(|t| from_template(t, date)),
        );
        instances.extend(
            sessions
                .iter()
                .filter(|s| s.occurs_on(date))
                .map(from_session),
        );
    }

    tracing::debug!(
        window_start = %window.start,
        window_days = window.days,
        templates = templates.len(),
        sessions = sessions.len(),
        projected = instances.len(),
        "Projected class instances",
    );

    instances
}

/// Synthesize the single occurrence designated by `key`, if its source
/// template or session exists, is active, and actually occurs on that date.
pub fn project_occurrence(
    key: &InstanceKey,
    templates: &[ScheduleTemplate],
    sessions: &[SpecialSession],
) -> Option<ClassInstance> {
    match key.kind {
        InstanceKind::Regular => templates
            .iter()
            .find(|t| t.id == key.source_id && t.occurs_on(key.date))
            .map(|t| from_template(t, key.date)),
        InstanceKind::Special => sessions
            .iter()
            .find(|s| s.id == key.source_id && s.occurs_on(key.date))
            .map(from_session),
    }
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

struct CachedProjection {
    fingerprint: String,
    instances: Arc<Vec<ClassInstance>>,
}

/// Single-entry memo of the last projection.
#[derive(Default)]
pub struct ProjectionCache {
    last: Mutex<Option<CachedProjection>>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the projection for these inputs, reusing the cached one when
    /// the fingerprint matches.
    pub fn get_or_project(
        &self,
        templates: &[ScheduleTemplate],
        sessions: &[SpecialSession],
        window: DateWindow,
    ) -> Arc<Vec<ClassInstance>> {
        let Some(fingerprint) = fingerprint(templates, sessions, window) else {
            return Arc::new(project(templates, sessions, window));
        };

        // The guarded value is always left consistent, so a poisoned lock is safe to reuse.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = last.as_ref().filter(|c| c.fingerprint == fingerprint) {
            tracing::debug!(%fingerprint, "Projection cache hit");
            return Arc::clone(&cached.instances);
        }

        let instances = Arc::new(project(templates, sessions, window));
        *last = Some(CachedProjection {
            fingerprint,
            instances: Arc::clone(&instances),
        });
        instances
    }
}

/// SHA-256 hex digest over the serialized projection inputs.
fn fingerprint(
    templates: &[ScheduleTemplate],
    sessions: &[SpecialSession],
    window: DateWindow,
) -> Option<String> {
    let payload = serde_json::to_vec(&(templates, sessions, window)).ok()?;
    let hash = Sha256::digest(&payload);
    Some(format!("{hash:x}"))
}
