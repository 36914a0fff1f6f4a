//! Error types for the engine crate.

use dbsetup_core::{CoreError, ResourceKind};
use dbsetup_credential::CredentialError;
use dbsetup_gateway::GatewayError;
use thiserror::Error;

/// Errors raised while planning or applying a reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Invalid input or missing setup; raised before any remote query.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Current state could not be read. No plan is built.
    #[error("failed to query {operation}: {source}")]
    RemoteQuery {
        operation: String,
        #[source]
        source: GatewayError,
    },

    /// An action failed during apply. Earlier actions stay applied.
    #[error("step {step} ({action}) failed: {source}")]
    RemoteApply {
        step: usize,
        action: String,
        #[source]
        source: GatewayError,
    },

    /// A deleted resource was still listed afterwards.
    #[error("step {step}: {kind} {name} still exists after delete")]
    NotDeleted {
        step: usize,
        kind: ResourceKind,
        name: String,
    },

    /// An action referenced a resource whose identifier is unknown.
    #[error("step {step}: no identifier known for {kind} {name}")]
    Unresolved {
        step: usize,
        kind: ResourceKind,
        name: String,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl ReconcileError {
    pub(crate) fn query(operation: impl Into<String>) -> impl FnOnce(GatewayError) -> Self {
        let operation = operation.into();
        move |source| ReconcileError::RemoteQuery { operation, source }
    }
}

impl From<CoreError> for ReconcileError {
    fn from(e: CoreError) -> Self {
        ReconcileError::Configuration(e.to_string())
    }
}
