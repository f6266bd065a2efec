use super::definition::Node;
use std::fmt;

/// The execution role a node type plays in a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Supplies a scalar value (user text, static context or prompt) but never executes.
    Control,
    /// Receives the final result; never executes.
    Terminal,
    /// Canvas decoration with no execution semantics.
    Cosmetic,
    /// A remote action that takes part in scheduling.
    Executable,
}

impl NodeRole {
    /// Classifies a node `type` string. The mapping is total: anything unknown executes.
    pub fn classify(node_type: &str) -> Self {
        match node_type {
            "input" | "workflowInput" | "context" | "prompt" => NodeRole::Control,
            "output" | "workflowOutput" => NodeRole::Terminal,
            "note" | "text-editor" => NodeRole::Cosmetic,
            _ => NodeRole::Executable,
        }
    }

    pub fn is_control(self) -> bool {
        self == NodeRole::Control
    }

    pub fn is_executable(self) -> bool {
        self == NodeRole::Executable
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeRole::Control => "control",
            NodeRole::Terminal => "terminal",
            NodeRole::Cosmetic => "cosmetic",
            NodeRole::Executable => "executable",
        };
        f.write_str(name)
    }
}

impl Node {
    pub fn role(&self) -> NodeRole {
        NodeRole::classify(&self.node_type)
    }

    /// `true` for the user-query input node (as opposed to context/prompt controls).
    pub fn is_query_input(&self) -> bool {
        matches!(self.node_type.as_str(), "input" | "workflowInput")
    }
}
