//! Error types for the gateway crate.

use dbsetup_core::ResourceKind;
use thiserror::Error;

/// Errors raised by a remote gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The CLI executable could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The CLI exited with a non-zero status.
    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The REST API answered with an error status.
    #[error("{method} {url} failed: {status} - {body}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The HTTP request could not be sent or its body not read.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response could not be interpreted.
    #[error("malformed response from {operation}: {detail}")]
    Malformed { operation: String, detail: String },

    /// The operation does not exist for this resource kind.
    #[error("{operation} is not supported for {kind}")]
    Unsupported {
        operation: &'static str,
        kind: ResourceKind,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

impl GatewayError {
    pub fn malformed(operation: impl Into<String>, detail: impl ToString) -> Self {
        GatewayError::Malformed {
            operation: operation.into(),
            detail: detail.to_string(),
        }
    }
}
