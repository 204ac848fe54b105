//! Reconciliation of projected instances with the persisted instance set.
//!
//! The merge is right-biased: any persisted instance replaces the projected
//! instance with the same identity, and persisted instances whose template
//! has since disappeared are kept.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::error::IdentityCollision;
use crate::identity::InstanceKey;
use crate::instance::ClassInstance;

/// Merge projected instances with persisted ones, persisted taking precedence.
///
/// Projected instances keep their input order; persisted instances follow,
/// sorted by identity so the output does not depend on map iteration order.
pub fn reconcile(
    projected: &[ClassInstance],
    persisted: &HashMap<InstanceKey, ClassInstance>,
) -> Vec<ClassInstance> {
    let mut merged: Vec<ClassInstance> = projected
        .iter()
        .filter(|inst| !persisted.contains_key(&inst.identity))
        .cloned()
        .collect();
    let overridden = projected.len() - merged.len();

    let mut overrides: Vec<&ClassInstance> = persisted.values().collect();
    overrides.sort_by_key(|inst| inst.identity);
    merged.extend(overrides.into_iter().cloned());

    tracing::debug!(
        projected = projected.len(),
        persisted = persisted.len(),
        overridden,
        merged = merged.len(),
        "Reconciled class instances",
    );

    merged
}

/// Check that no identity appears twice.
pub fn check_unique_identities(instances: &[ClassInstance]) -> Result<(), IdentityCollision> {
    let mut seen = HashSet::with_capacity(instances.len());
    for inst in instances {
        if !seen.insert(inst.identity) {
            return Err(IdentityCollision(inst.identity));
        }
    }
    Ok(())
}

/// Select the instances on `date`, ordered by start time.
///
/// Ties are broken by unit and then identity so the ordering is total.
///
/// # Panics
///
/// Panics on an [`IdentityCollision`]: duplicate identities can only come
/// from a broken identity derivation and must not be papered over.
pub fn instances_for_date(merged: &[ClassInstance], date: NaiveDate) -> Vec<ClassInstance> {
    let mut day: Vec<ClassInstance> = merged.iter().filter(|i| i.date == date).cloned().collect();

    if let Err(collision) = check_unique_identities(&day) {
        panic!("{collision}");
    }

    day.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.unit.cmp(&b.unit))
            .then_with(|| a.identity.cmp(&b.identity))
    });
    day
}
