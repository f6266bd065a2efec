//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowplan crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowplan::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let compiler = Compiler::new(&std::fs::read_to_string("path/to/workflow.json")?)?;
//! let compiled = compiler.compile();
//! println!("{}", compiled.plan);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{Edge, Graph, GraphIndex, IntoGraph, Node, NodeRole};

// Compilation
pub use crate::compiler::scheduler::SchedulingWarning;
pub use crate::compiler::{Compiler, CompilerBuilder};
pub use crate::plan::{
    CompiledWorkflow, ConfigurationPayload, ExecutionPlan, ExecutionRequest, PlanStep,
    PreflightOptions,
};

// Execution
pub use crate::runner::{RunReport, StepContext, StepExecutor, run_plan};

// Secrets
pub use crate::secure::{FieldCodec, MasterKey, is_encrypted, mask_secret};

// Error types
pub use crate::error::{CodecError, ConfigError, GraphError, PreflightError, RunError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
