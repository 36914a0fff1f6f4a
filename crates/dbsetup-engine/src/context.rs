//! Everything a reconciliation run needs, passed explicitly.

use dbsetup_credential::ElevatedCredentials;
use dbsetup_gateway::RemoteGateway;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Destination for rendered plans.
pub trait OutputSink: Send + Sync {
    fn emit(&self, text: &str);
}

/// Writes to stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        // Nothing sensible to do if stdout is gone.
        let _ = out.write_all(text.as_bytes());
        if !text.ends_with('\n') {
            let _ = out.write_all(b"\n");
        }
        let _ = out.flush();
    }
}

/// Collects output in memory.
#[derive(Default)]
pub struct BufferSink {
    buffer: Mutex<String>,
}

impl BufferSink {
    pub fn contents(&self) -> String {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

impl OutputSink for BufferSink {
    fn emit(&self, text: &str) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push_str(text);
        }
    }
}

/// Asks the operator whether to apply a rendered plan.
pub trait Confirm: Send + Sync {
    /// `plan` is the text being approved; `prompt` is the question suffix.
    fn confirm(&self, plan: &str, prompt: &str) -> bool;
}

/// `Y` or `y`, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Prompts on the terminal. The plan itself has already gone to the output
/// sink, so only the prompt is printed.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, _plan: &str, prompt: &str) -> bool {
        let answer = dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text();
        match answer {
            Ok(answer) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation; treating as no");
                false
            }
        }
    }
}

/// Answers every prompt with a fixed reply and records what was asked.
pub struct ScriptedConfirm {
    answer: String,
    prompts: Mutex<Vec<String>>,
    plans: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
            plans: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Plan texts shown with each prompt.
    pub fn plans(&self) -> Vec<String> {
        self.plans.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, plan: &str, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Ok(mut plans) = self.plans.lock() {
            plans.push(plan.to_string());
        }
        is_affirmative(&self.answer)
    }
}

/// Resolved profile plus the injected collaborators of one invocation.
#[derive(Clone)]
pub struct ExecutionContext {
    pub profile: String,
    pub gateway: Arc<dyn RemoteGateway>,
    pub credentials: Option<Arc<dyn ElevatedCredentials>>,
    pub output: Arc<dyn OutputSink>,
    pub confirm: Arc<dyn Confirm>,
}

impl ExecutionContext {
    /// Context writing to stdout and prompting on the terminal.
    pub fn new(profile: impl Into<String>, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            profile: profile.into(),
            gateway,
            credentials: None,
            output: Arc::new(StdoutSink),
            confirm: Arc::new(TerminalConfirm),
        }
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn ElevatedCredentials>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_output(mut self, output: Arc<dyn OutputSink>) -> Self {
        self.output = output;
        self
    }

    pub fn with_confirm(mut self, confirm: Arc<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn gateway(&self) -> &dyn RemoteGateway {
        self.gateway.as_ref()
    }
}
