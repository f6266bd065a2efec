use super::{CompiledWorkflow, PlanStep};
use crate::compiler::node_config::NodeConfig;
use crate::error::PreflightError;

/// Keys under which a step can receive its primary text.
const PRIMARY_TEXT_KEYS: &[&str] = &[
    "user_prompt",
    "input_value",
    "prompt_value",
    "user_prompt_value",
];

/// What the pre-flight check insists on before a plan may be dispatched.
#[derive(Debug, Clone, Copy)]
pub struct PreflightOptions {
    /// Reject plans when the input node holds no query.
    pub require_user_query: bool,
    /// Reject model steps that get no text of their own (own data or a wired slot).
    pub require_step_text: bool,
}

impl Default for PreflightOptions {
    fn default() -> Self {
        Self {
            require_user_query: true,
            require_step_text: false,
        }
    }
}

impl CompiledWorkflow {
    /// Validates the compiled workflow before execution.
    ///
    /// The compiler never fails on missing parameters; this is where callers turn them
    /// into errors.
    pub fn preflight(&self, options: PreflightOptions) -> Result<(), PreflightError> {
        if self.plan.is_empty() {
            return Err(PreflightError::NoExecutableNodes);
        }
        if options.require_user_query && self.user_query.trim().is_empty() {
            return Err(PreflightError::EmptyUserQuery);
        }
        if options.require_step_text {
            if let Some(step) = self.plan.steps.iter().find(|s| lacks_primary_text(s)) {
                return Err(PreflightError::MissingPrimaryText {
                    node_id: step.node_id.clone(),
                    backend_id: step.backend_id.clone(),
                });
            }
        }
        Ok(())
    }
}

fn lacks_primary_text(step: &PlanStep) -> bool {
    let takes_text =
        NodeConfig::from_data(&step.canonical_type, &Default::default()).takes_primary_text();
    takes_text && !PRIMARY_TEXT_KEYS.iter().any(|k| step.params.contains_key(*k))
}
