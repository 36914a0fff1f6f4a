//! Desired vs current comparison for groups and grants.

use dbsetup_core::{AccessGroups, Grant, PrincipalPermissions};
use std::collections::BTreeSet;

/// Desired groups missing from the workspace, in derivation order.
/// Extra live groups are never reported.
pub fn missing_groups(desired: &AccessGroups, live: &BTreeSet<String>) -> Vec<String> {
    desired
        .names()
        .filter(|name| !live.contains(*name))
        .map(str::to_string)
        .collect()
}

/// One step of converging a resource's grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantChange {
    Add(Grant),
    /// Remove every direct level the principal holds now.
    Remove(PrincipalPermissions),
}

/// Changes that turn `current` into `desired`.
///
/// Desired principals are handled in order. Absent ones are added. One that
/// holds anything other than exactly the desired level is removed, then
/// re-added with that level. Current principals missing from `desired` are
/// removed afterwards, in current order. A principal repeated in `desired`
/// keeps its last level.
pub fn diff_grants(desired: &[Grant], current: &[PrincipalPermissions]) -> Vec<GrantChange> {
    let mut wanted: Vec<Grant> = Vec::with_capacity(desired.len());
    for grant in desired {
        match wanted.iter_mut().find(|g| g.principal == grant.principal) {
            Some(existing) => existing.level = grant.level,
            None => wanted.push(grant.clone()),
        }
    }

    let mut changes = Vec::new();
    for grant in &wanted {
        match current.iter().find(|c| c.principal == grant.principal) {
            None => changes.push(GrantChange::Add(grant.clone())),
            Some(held) if !held.holds_only(grant.level) => {
                changes.push(GrantChange::Remove(held.clone()));
                changes.push(GrantChange::Add(grant.clone()));
            }
            Some(_) => {}
        }
    }

    for held in current {
        if !wanted.iter().any(|g| g.principal == held.principal) {
            changes.push(GrantChange::Remove(held.clone()));
        }
    }

    changes
}
