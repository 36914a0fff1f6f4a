//! Reading current state from the workspace.
//!
//! Every read goes through the gateway; nothing is cached between calls. A
//! failed read is a [`ReconcileError::RemoteQuery`] and aborts planning.

use crate::error::ReconcileError;
use dbsetup_core::{ManagedResource, PermissionLevel, PrincipalPermissions, ResourceKind, ResourceName, ResourceRef};
use dbsetup_gateway::{AclEntry, RemoteGateway};
use std::collections::BTreeSet;

/// Non-inherited grants on one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentGrants {
    /// Every direct level per principal, principals in listing order.
    pub principals: Vec<PrincipalPermissions>,
}

pub struct StateExtractor<'a> {
    gateway: &'a dyn RemoteGateway,
}

impl<'a> StateExtractor<'a> {
    pub fn new(gateway: &'a dyn RemoteGateway) -> Self {
        Self { gateway }
    }

    pub async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ManagedResource>, ReconcileError> {
        tracing::debug!(kind = %kind, "Listing resources");
        self.gateway
            .list_resources(kind)
            .await
            .map_err(ReconcileError::query(format!("{} list", kind)))
    }

    /// Resources whose name matches `name` under its kind's matching rule.
    pub async fn matching(&self, name: &ResourceName) -> Result<Vec<ManagedResource>, ReconcileError> {
        let resources = self.list_resources(name.kind()).await?;
        Ok(resources.into_iter().filter(|r| name.matches(&r.name)).collect())
    }

    pub async fn list_groups(&self) -> Result<BTreeSet<String>, ReconcileError> {
        tracing::debug!("Listing groups");
        let groups = self
            .gateway
            .list_groups()
            .await
            .map_err(ReconcileError::query("groups list"))?;
        Ok(groups.into_iter().collect())
    }

    pub async fn list_grants(&self, resource: &ResourceRef) -> Result<CurrentGrants, ReconcileError> {
        tracing::debug!(kind = %resource.kind, id = %resource.id, "Listing grants");
        let entries = self
            .gateway
            .get_grants(resource)
            .await
            .map_err(ReconcileError::query(format!("{} permissions for {}", resource.kind, resource.id)))?;

        Ok(aggregate_grants(entries))
    }
}

/// Fold ACL entries into per-principal levels, ignoring inherited ones.
/// Principals with only inherited levels are dropped.
pub fn aggregate_grants(entries: Vec<AclEntry>) -> CurrentGrants {
    let mut merged: Vec<(String, Vec<PermissionLevel>)> = Vec::new();
    for entry in entries {
        let levels = entry.direct_levels();
        match merged.iter_mut().find(|(p, _)| *p == entry.principal) {
            Some((_, existing)) => existing.extend(levels),
            None => merged.push((entry.principal, levels)),
        }
    }

    let principals = merged
        .into_iter()
        .filter(|(_, levels)| !levels.is_empty())
        .map(|(principal, levels)| PrincipalPermissions::new(principal, levels))
        .collect();

    CurrentGrants { principals }
}
