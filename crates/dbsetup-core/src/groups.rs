//! Access-group derivation.
//!
//! Every managed resource gets three access groups named
//! `<kind>-<name>-<tier>`, each holding one permission level on the resource.

use crate::permission::PermissionLevel;
use crate::resource::{ResourceKind, ResourceName};

/// One derived access group and the level it should hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGroup {
    pub name: String,
    pub level: PermissionLevel,
}

/// The ordered group → level mapping for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessGroups(Vec<AccessGroup>);

impl AccessGroups {
    pub fn iter(&self) -> impl Iterator<Item = &AccessGroup> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|g| g.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn tiers(kind: ResourceKind) -> [(&'static str, PermissionLevel); 3] {
    match kind {
        ResourceKind::Cluster => [
            ("manage", PermissionLevel::CanManage),
            ("restart", PermissionLevel::CanRestart),
            ("attach", PermissionLevel::CanAttachTo),
        ],
        ResourceKind::Scope => [
            ("read", PermissionLevel::Read),
            ("write", PermissionLevel::Write),
            ("manage", PermissionLevel::Manage),
        ],
    }
}

/// Derive the access groups for a resource. Pure and total.
pub fn derive_access_groups(name: &ResourceName) -> AccessGroups {
    let kind = name.kind();
    AccessGroups(
        tiers(kind)
            .into_iter()
            .map(|(tier, level)| AccessGroup {
                name: format!("{}-{}-{}", kind.as_str(), name.as_str(), tier),
                level,
            })
            .collect(),
    )
}
