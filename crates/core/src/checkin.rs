//! Pre-check-in and attendance state machine for one class instance.
//!
//! Every operation works on an in-memory snapshot and either mutates it
//! completely or leaves it untouched. Persisting the result is the caller's
//! job (see [`crate::roster::Roster`]).
//!
//! Instance status moves `open -> presence_confirmed -> closed`, or straight
//! from `open` to `closed`. Pre-check-ins may only be added or cancelled
//! while the class is open; attendance may be confirmed until it is closed.

use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;
use crate::instance::{
    AttendanceRecord, AttendanceStatus, ClassInstance, InstanceStatus, PreCheckin,
};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Capacity accounting
// ---------------------------------------------------------------------------

/// Pre-check-ins that still count: everything not cancelled.
pub fn active_pre_checkins(instance: &ClassInstance) -> impl Iterator<Item = &PreCheckin> {
    instance.pre_checkins.iter().filter(|p| !p.cancelled)
}

/// Number of non-cancelled pre-check-ins.
pub fn occupied(instance: &ClassInstance) -> u32 {
    u32::try_from(active_pre_checkins(instance).count()).unwrap_or(u32::MAX)
}

/// Remaining places, or `None` when the class has no capacity limit.
///
/// Saturates at zero if the capacity was lowered below the current count.
pub fn available(instance: &ClassInstance) -> Option<u32> {
    instance
        .capacity
        .map(|capacity| capacity.saturating_sub(occupied(instance)))
}

fn require_status(
    instance: &ClassInstance,
    allowed: &[InstanceStatus],
    action: &'static str,
) -> Result<(), CoreError> {
    if allowed.contains(&instance.status) {
        Ok(())
    } else {
        Err(CoreError::StatusConflict {
            instance: instance.identity,
            status: instance.status,
            action,
        })
    }
}

// ---------------------------------------------------------------------------
// Per-student operations
// ---------------------------------------------------------------------------

/// Add a pre-check-in for `student_id` and return its id.
///
/// Fails with [`CoreError::DuplicateCheckin`] if the student already holds a
/// non-cancelled pre-check-in, and with [`CoreError::CapacityExceeded`] when
/// the class is full. The name is stored trimmed and must not be blank.
pub fn add_pre_checkin(
    instance: &mut ClassInstance,
    student_id: DbId,
    student_name: &str,
    now: Timestamp,
) -> Result<Uuid, CoreError> {
    let student_name = student_name.trim();
    if student_name.is_empty() {
        return Err(CoreError::Validation(
            "Student name must not be blank".to_string(),
        ));
    }

    require_status(instance, &[InstanceStatus::Open], "add a pre-check-in")?;

    if active_pre_checkins(instance).any(|p| p.student_id == student_id) {
        return Err(CoreError::DuplicateCheckin {
            instance: instance.identity,
            student_id,
        });
    }

    if let Some(capacity) = instance.capacity {
        if occupied(instance) >= capacity {
            return Err(CoreError::CapacityExceeded {
                instance: instance.identity,
                capacity,
            });
        }
    }

    let id = Uuid::new_v4();
    instance.pre_checkins.push(PreCheckin {
        id,
        student_id,
        student_name: student_name.to_string(),
        checked_in_at: now,
        cancelled: false,
    });
    Ok(id)
}

/// Soft-delete a pre-check-in. The entry is kept for audit.
pub fn cancel_pre_checkin(instance: &mut ClassInstance, checkin_id: Uuid) -> Result<(), CoreError> {
    require_status(instance, &[InstanceStatus::Open], "cancel a pre-check-in")?;

    let entry = instance
        .pre_checkins
        .iter_mut()
        .find(|p| p.id == checkin_id && !p.cancelled)
        .ok_or_else(|| CoreError::NotFound {
            entity: "PreCheckin",
            id: checkin_id.to_string(),
        })?;

    entry.cancelled = true;
    Ok(())
}

/// Record presence or absence for a student, replacing any earlier record.
///
/// No prior pre-check-in is required, so walk-ins can be recorded directly.
pub fn confirm_attendance(
    instance: &mut ClassInstance,
    student_id: DbId,
    present: bool,
    now: Timestamp,
) -> Result<(), CoreError> {
    require_status(
        instance,
        &[InstanceStatus::Open, InstanceStatus::PresenceConfirmed],
        "confirm attendance",
    )?;

    let record = AttendanceRecord {
        student_id,
        status: AttendanceStatus::from_present(present),
        confirmed_at: now,
    };

    match instance
        .confirmed_attendance
        .iter_mut()
        .find(|r| r.student_id == student_id)
    {
        Some(existing) => *existing = record,
        None => instance.confirmed_attendance.push(record),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Instance status
// ---------------------------------------------------------------------------

pub mod state_machine {
    use crate::instance::InstanceStatus;

    /// Statuses reachable from `from`. `Closed` is terminal.
    pub fn valid_transitions(from: InstanceStatus) -> &'static [InstanceStatus] {
        match from {
            InstanceStatus::Open => &[InstanceStatus::PresenceConfirmed, InstanceStatus::Closed],
            InstanceStatus::PresenceConfirmed => &[InstanceStatus::Closed],
            InstanceStatus::Closed => &[],
        }
    }

    pub fn can_transition(from: InstanceStatus, to: InstanceStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a transition, returning an error message for invalid ones.
    pub fn validate_transition(from: InstanceStatus, to: InstanceStatus) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!("{from} -> {to}"))
        }
    }
}

fn transition(instance: &mut ClassInstance, to: InstanceStatus) -> Result<(), CoreError> {
    state_machine::validate_transition(instance.status, to)
        .map_err(|msg| CoreError::InvalidTransition(format!("{} ({msg})", instance.identity)))?;
    instance.status = to;
    Ok(())
}

/// Mark the roster as checked by staff (`open -> presence_confirmed`).
pub fn confirm_presence(instance: &mut ClassInstance) -> Result<(), CoreError> {
    transition(instance, InstanceStatus::PresenceConfirmed)
}

/// Close the class for good.
pub fn close(instance: &mut ClassInstance) -> Result<(), CoreError> {
    transition(instance, InstanceStatus::Closed)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counters shown next to each class on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    pub occupied: u32,
    /// `None` when the class has no capacity limit.
    pub available: Option<u32>,
    pub cancelled: u32,
    pub present: u32,
    pub absent: u32,
}

pub fn summarize(instance: &ClassInstance) -> RosterSummary {
    let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
    let with_status = |status: AttendanceStatus| {
        count(
            instance
                .confirmed_attendance
                .iter()
                .filter(|r| r.status == status)
                .count(),
        )
    };

    RosterSummary {
        occupied: occupied(instance),
        available: available(instance),
        cancelled: count(instance.pre_checkins.iter().filter(|p| p.cancelled).count()),
        present: with_status(AttendanceStatus::Present),
        absent: with_status(AttendanceStatus::Absent),
    }
}
