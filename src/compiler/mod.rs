use crate::error::GraphError;
use crate::graph::{Graph, GraphIndex, IntoGraph};
use crate::plan::{CompiledWorkflow, ExecutionPlan};
use tracing::{debug, info};

pub(crate) mod fields;
pub mod flatten;
pub mod identity;
pub mod node_config;
pub mod reachability;
pub mod scheduler;

use identity::{TypeInstanceCounter, TypeRenames, resolve_identities};

/// Compiles a canvas graph into an execution plan and its configuration payload.
///
/// Compilation is a pure function of the graph: it holds no state between calls, so
/// compiling the same graph twice yields identical output.
pub struct Compiler {
    graph: Graph,
    renames: TypeRenames,
}

pub struct CompilerBuilder {
    graph: Graph,
    renames: TypeRenames,
}

impl CompilerBuilder {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            renames: TypeRenames::default(),
        }
    }

    /// Maps a canvas node type onto the backend type it should execute as.
    ///
    /// Applied on top of the built-in renames; a later mapping for the same canvas type
    /// replaces the earlier one.
    pub fn with_type_mapping(mut self, ui_type: &str, backend_type: &str) -> Self {
        self.renames.insert(ui_type, backend_type);
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            graph: self.graph,
            renames: self.renames,
        }
    }
}

impl Compiler {
    pub fn builder(graph: Graph) -> CompilerBuilder {
        CompilerBuilder::new(graph)
    }

    /// Parses a `{ nodes, edges }` JSON document and builds a compiler with default renames.
    pub fn new(graph_json: &str) -> Result<Self, GraphError> {
        Ok(Self::builder(Graph::from_json(graph_json)?).build())
    }

    /// Converts any custom canvas format and builds a compiler with default renames.
    pub fn from_source(source: impl IntoGraph) -> Result<Self, GraphError> {
        Ok(Self::builder(source.into_graph()?).build())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn compile(&self) -> CompiledWorkflow {
        let index = GraphIndex::new(&self.graph);

        // 1. Keep executable nodes that belong to a live workflow
        let filtered = reachability::filter_executable(&index);
        debug!(
            total = index.nodes().len(),
            executable = filtered.len(),
            "filtered executable nodes"
        );

        // 2. Order them, breaking cycles if needed
        let schedule = scheduler::schedule(&index, &filtered);

        // 3. Number instances in execution order
        let mut counter = TypeInstanceCounter::new();
        let identities = resolve_identities(&schedule.order, &self.renames, &mut counter);

        // 4. Resolve parameters and build both payload shapes in one walk
        let flattened = flatten::flatten(&index, &schedule.order, &identities);

        let plan = ExecutionPlan {
            steps: flattened.steps,
        };
        info!(
            steps = plan.len(),
            cycles_broken = schedule.warnings.len(),
            "compiled workflow"
        );

        CompiledWorkflow {
            plan,
            payload: flattened.payload,
            user_query: flatten::user_query(&index),
            warnings: schedule.warnings,
        }
    }
}
