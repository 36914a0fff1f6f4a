//! Confirmation before a plan is applied.

use crate::context::{Confirm, OutputSink};
use crate::plan::Plan;

/// Suffix shown when asking the operator to confirm.
pub const PROMPT: &str = "(Y/N)";

pub struct ConfirmationGate<'a> {
    output: &'a dyn OutputSink,
    confirm: &'a dyn Confirm,
}

impl<'a> ConfirmationGate<'a> {
    pub fn new(output: &'a dyn OutputSink, confirm: &'a dyn Confirm) -> Self {
        Self { output, confirm }
    }

    /// Render the plan and decide whether to apply it.
    ///
    /// `debug` only renders. An empty plan never prompts and never applies.
    /// `quiet` applies without prompting; otherwise the operator must answer `Y`.
    pub fn should_apply(&self, plan: &Plan, debug: bool, quiet: bool) -> bool {
        let rendered = plan.render();
        self.output.emit(&rendered);

        if debug {
            tracing::info!(actions = plan.len(), "Debug mode; plan not applied");
            return false;
        }
        if plan.is_empty() {
            return false;
        }
        if quiet {
            return true;
        }

        let approved = self.confirm.confirm(&rendered, PROMPT);
        if !approved {
            tracing::info!("Plan not confirmed; nothing applied");
        }
        approved
    }
}
