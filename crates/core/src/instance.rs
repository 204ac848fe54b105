//! Concrete class occurrences and their per-student records.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{InstanceKey, InstanceKind};
use crate::types::{DbId, Timestamp};

/// Lifecycle of a class occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Open,
    PresenceConfirmed,
    Closed,
}

impl InstanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InstanceStatus::Open => "open",
            InstanceStatus::PresenceConfirmed => "presence_confirmed",
            InstanceStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student's request to attend, recorded before staff confirmation.
///
/// Cancelled entries stay in the list for audit but are never counted
/// toward capacity or shown on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreCheckin {
    pub id: Uuid,
    pub student_id: DbId,
    pub student_name: String,
    pub checked_in_at: Timestamp,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn from_present(present: bool) -> Self {
        if present {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        }
    }
}

/// Staff-recorded final presence of one student. At most one per student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: DbId,
    pub status: AttendanceStatus,
    pub confirmed_at: Timestamp,
}

/// One concrete occurrence of a class on one date.
///
/// The back-reference to the originating template or session is carried by
/// the identity, so exactly one of [`source_template_id`] and [`session_id`]
/// is ever set.
///
/// `created_at` / `updated_at` stay `None` while the instance is a pure
/// projection and are stamped when it materializes on first mutation.
///
/// [`source_template_id`]: ClassInstance::source_template_id
/// [`session_id`]: ClassInstance::session_id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInstance {
    pub identity: InstanceKey,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub unit: String,
    pub level_id: Option<DbId>,
    /// `None` means unlimited.
    pub capacity: Option<u32>,
    pub status: InstanceStatus,
    pub pre_checkins: Vec<PreCheckin>,
    pub confirmed_attendance: Vec<AttendanceRecord>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl ClassInstance {
    pub fn kind(&self) -> InstanceKind {
        self.identity.kind
    }

    pub fn source_template_id(&self) -> Option<DbId> {
        match self.identity.kind {
            InstanceKind::Regular => Some(self.identity.source_id),
            InstanceKind::Special => None,
        }
    }

    pub fn session_id(&self) -> Option<DbId> {
        match self.identity.kind {
            InstanceKind::Special => Some(self.identity.source_id),
            InstanceKind::Regular => None,
        }
    }

    /// Whether this instance has been written to the persisted set.
    pub fn is_materialized(&self) -> bool {
        self.created_at.is_some()
    }

    /// Stamp mutation timestamps, setting `created_at` on first write.
    pub fn touch(&mut self, now: Timestamp) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }
}
