//! # dbsetup-core
//!
//! Shared types for dbsetup: managed resources, permission levels and grants,
//! access-group derivation, and configuration (tool settings plus the
//! control-plane CLI profile file).

// Configuration types shared across all dbsetup crates
pub mod config;
pub mod error;
pub mod groups;
pub mod permission;
pub mod resource;
pub mod spec;

pub use config::{ClusterTemplate, DbSetupConfig, ProfileConfig, ProfileStore};
pub use error::{ConfigError, CoreError};
pub use groups::{AccessGroup, AccessGroups, derive_access_groups};
pub use permission::{Grant, PermissionLevel, PrincipalPermissions};
pub use resource::{LifecycleStatus, ManagedResource, ResourceKind, ResourceName, ResourceRef};
pub use spec::{ResourceSpec, ScopeBackend};
