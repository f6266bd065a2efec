use crate::compiler::scheduler::SchedulingWarning;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

mod preflight;

pub use preflight::PreflightOptions;

/// One scheduled unit of execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub node_id: String,
    /// The node's type as drawn on the canvas, before renaming.
    pub node_type: String,
    /// The backend type the node was renamed to.
    pub canonical_type: String,
    /// Canonical type plus instance suffix; unique within the plan.
    pub backend_id: String,
    pub params: Map<String, Value>,
}

/// Steps in the order they must run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub steps: Vec<PlanStep>,
}

/// The flattened configuration sent to node executors.
///
/// `apiKeys` is the coarse legacy view with instance-suffixed keys; `nodeParams` is keyed
/// by backend id. Both serialize with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationPayload {
    #[serde(rename = "apiKeys")]
    pub api_keys: Map<String, Value>,
    #[serde(rename = "nodeParams")]
    pub node_params: BTreeMap<String, Map<String, Value>>,
}

/// The body of the synchronous call to the remote execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub node_ids: Vec<String>,
    pub user_query: String,
    pub api_keys: Map<String, Value>,
    pub node_params: BTreeMap<String, Map<String, Value>>,
}

/// Everything the compiler derives from a graph. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct CompiledWorkflow {
    pub plan: ExecutionPlan,
    pub payload: ConfigurationPayload,
    pub user_query: String,
    pub warnings: Vec<SchedulingWarning>,
}

impl ExecutionPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn backend_ids(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.backend_id.clone()).collect()
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.node_id.as_str()).collect()
    }

    pub fn step(&self, backend_id: &str) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.backend_id == backend_id)
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return writeln!(f, "(empty plan)");
        }
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(
                f,
                "{:>3}. {:<24} node '{}' [{}], {} param(s)",
                i + 1,
                step.backend_id,
                step.node_id,
                step.node_type,
                step.params.len()
            )?;
        }
        Ok(())
    }
}

impl ConfigurationPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl CompiledWorkflow {
    /// Builds the request body for the execution service.
    pub fn request(&self) -> ExecutionRequest {
        ExecutionRequest {
            node_ids: self.plan.backend_ids(),
            user_query: self.user_query.clone(),
            api_keys: self.payload.api_keys.clone(),
            node_params: self.payload.node_params.clone(),
        }
    }

    /// `true` when the scheduler had to break at least one cycle.
    pub fn had_cycles(&self) -> bool {
        !self.warnings.is_empty()
    }
}
