//! # dbsetup-gateway
//!
//! Everything dbsetup says to the remote workspace goes through the
//! [`RemoteGateway`] trait. The production implementation,
//! [`WorkspaceGateway`], runs the `databricks` CLI as a subprocess and talks
//! to the REST permissions API for cluster ACLs.

pub mod cli;
pub mod error;
pub mod gateway;
pub mod permissions;
pub mod runner;
pub mod table;
pub mod workspace;

pub use cli::DatabricksCli;
pub use error::GatewayError;
pub use gateway::{AclEntry, AclPermission, RemoteGateway};
pub use permissions::PermissionsClient;
pub use runner::{CliRunner, ProcessRunner};
pub use workspace::WorkspaceGateway;
