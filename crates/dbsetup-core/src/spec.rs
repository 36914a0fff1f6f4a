//! Desired specifications for resources dbsetup creates or edits.

use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};

/// Backend of a secret scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScopeBackend {
    /// Backed by an Azure Key Vault.
    AzureKeyVault { resource_id: String, dns_name: String },
}

impl ScopeBackend {
    /// Key-vault backend for a vault name and its ARM resource id.
    pub fn key_vault(vault_name: &str, resource_id: impl Into<String>) -> Self {
        ScopeBackend::AzureKeyVault {
            resource_id: resource_id.into(),
            dns_name: format!("https://{}.vault.azure.net/", vault_name),
        }
    }
}

/// What to create or push for a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResourceSpec {
    Cluster {
        name: String,
        /// Create/edit payload (see `ClusterTemplate::to_spec`).
        config: serde_json::Value,
    },
    Scope {
        name: String,
        backend: ScopeBackend,
    },
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Cluster { .. } => ResourceKind::Cluster,
            ResourceSpec::Scope { .. } => ResourceKind::Scope,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourceSpec::Cluster { name, .. } | ResourceSpec::Scope { name, .. } => name,
        }
    }
}
