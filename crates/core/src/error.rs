use crate::identity::InstanceKey;
use crate::instance::InstanceStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Student {student_id} already has an active pre-check-in for {instance}")]
    DuplicateCheckin {
        instance: InstanceKey,
        student_id: DbId,
    },

    #[error("Class {instance} is full ({capacity} places)")]
    CapacityExceeded {
        instance: InstanceKey,
        capacity: u32,
    },

    #[error("Cannot {action} on {instance}: class is {status}")]
    StatusConflict {
        instance: InstanceKey,
        status: InstanceStatus,
        action: &'static str,
    },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Two instances in one merged set share an identity.
///
/// Only possible if identity derivation stopped being injective, so callers
/// treat it as a programming error and panic instead of recovering.
#[derive(Debug, thiserror::Error)]
#[error("Identity collision: {0} appears more than once in the merged set")]
pub struct IdentityCollision(pub InstanceKey);
