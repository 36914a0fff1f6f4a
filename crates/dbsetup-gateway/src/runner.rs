//! Subprocess execution of the control-plane CLI.

use crate::error::GatewayError;
use async_trait::async_trait;
use tokio::process::Command;

/// Runs one CLI invocation and returns its stdout.
#[async_trait]
pub trait CliRunner: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<String, GatewayError>;
}

/// Runs the CLI as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl CliRunner for ProcessRunner {
    async fn run(&self, args: &[String]) -> Result<String, GatewayError> {
        let command_line = render_command(&self.program, args);
        tracing::debug!(command = %command_line, "Running CLI");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|source| GatewayError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GatewayError::CommandFailed {
                command: command_line,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Human-readable command line for logs and errors. Long JSON payloads are elided.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    for arg in args {
        if arg.starts_with('{') {
            parts.push("'{…}'".to_string());
        } else {
            parts.push(arg.clone());
        }
    }
    parts.join(" ")
}
