use crate::error::RunError;
use crate::plan::{CompiledWorkflow, ConfigurationPayload, PlanStep};
use serde_json::Value;
use tracing::{debug, info, warn};

/// What an executor sees besides the step itself.
pub struct StepContext<'a> {
    pub user_query: &'a str,
    pub payload: &'a ConfigurationPayload,
    /// Outputs of the steps that already ran, in plan order.
    pub previous: &'a [StepOutput],
}

/// Runs a single plan step. Implementations typically call out to the execution service.
///
/// Timeouts and retries are the executor's concern; the runner only sequences steps.
pub trait StepExecutor {
    fn execute(&mut self, step: &PlanStep, context: &StepContext<'_>) -> Result<Value, String>;
}

impl<F> StepExecutor for F
where
    F: FnMut(&PlanStep, &StepContext<'_>) -> Result<Value, String>,
{
    fn execute(&mut self, step: &PlanStep, context: &StepContext<'_>) -> Result<Value, String> {
        self(step, context)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub node_id: String,
    pub backend_id: String,
    pub output: Value,
}

/// Progress notification emitted before each step starts.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// Zero-based position of the step in the plan.
    pub index: usize,
    pub total: usize,
    pub step: &'a PlanStep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outputs: Vec<StepOutput>,
    /// `true` when the caller stopped the run before every step was issued.
    pub cancelled: bool,
}

impl RunReport {
    /// Output of the last step that ran, if any.
    pub fn final_output(&self) -> Option<&Value> {
        self.outputs.last().map(|o| &o.output)
    }
}

/// Drives `workflow`'s plan one step at a time in scheduler order.
///
/// `should_continue` is checked before every step; returning `false` stops the run without
/// error. The first executor failure stops the run and is returned.
pub fn run_plan<E, C, P>(
    workflow: &CompiledWorkflow,
    executor: &mut E,
    mut should_continue: C,
    mut on_progress: P,
) -> Result<RunReport, RunError>
where
    E: StepExecutor + ?Sized,
    C: FnMut() -> bool,
    P: FnMut(Progress<'_>),
{
    let total = workflow.plan.len();
    let mut outputs: Vec<StepOutput> = Vec::with_capacity(total);

    for (index, step) in workflow.plan.steps.iter().enumerate() {
        if !should_continue() {
            warn!(completed = outputs.len(), total, "run cancelled");
            return Ok(RunReport {
                outputs,
                cancelled: true,
            });
        }

        on_progress(Progress { index, total, step });
        debug!(backend_id = %step.backend_id, node_id = %step.node_id, "executing step");

        let context = StepContext {
            user_query: &workflow.user_query,
            payload: &workflow.payload,
            previous: &outputs,
        };
        let output = executor
            .execute(step, &context)
            .map_err(|message| RunError::StepFailed {
                node_id: step.node_id.clone(),
                backend_id: step.backend_id.clone(),
                message,
            })?;

        outputs.push(StepOutput {
            node_id: step.node_id.clone(),
            backend_id: step.backend_id.clone(),
            output,
        });
    }

    info!(steps = outputs.len(), "run finished");
    Ok(RunReport {
        outputs,
        cancelled: false,
    })
}
