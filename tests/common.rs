//! Common test utilities for building canvas graphs and codecs.
use flowplan::prelude::*;

pub const TEST_MASTER_KEY: &str = "test-master-key-0123456789abcdefghij";

/// Builds a graph from `(id, type)` pairs and `(source, target)` edges.
#[allow(dead_code)]
pub fn graph(nodes: &[(&str, &str)], edges: &[(&str, &str)]) -> Graph {
    Graph {
        nodes: nodes.iter().map(|(id, ty)| Node::new(*id, *ty)).collect(),
        edges: edges.iter().map(|(s, t)| Edge::new(*s, *t)).collect(),
    }
}

/// `input(value) -> openai -> output`, the smallest useful workflow.
#[allow(dead_code)]
pub fn create_simple_workflow(query: &str) -> Graph {
    Graph {
        nodes: vec![
            Node::new("in", "input").with_data("value", query),
            Node::new("ai", "openai")
                .with_data("apiKey", "sk-test")
                .with_data("model", "gpt-4o"),
            Node::new("out", "output"),
        ],
        edges: vec![
            Edge::new("in", "ai").with_target_handle("input"),
            Edge::new("ai", "out"),
        ],
    }
}

/// Three chained `openai` nodes fed by one input.
#[allow(dead_code)]
pub fn create_openai_chain() -> Graph {
    Graph {
        nodes: vec![
            Node::new("in", "input").with_data("value", "hello"),
            Node::new("a", "openai").with_data("model", "gpt-4o"),
            Node::new("b", "openai").with_data("model", "gpt-4o-mini"),
            Node::new("c", "openai"),
        ],
        edges: vec![
            Edge::new("in", "a"),
            Edge::new("a", "b"),
            Edge::new("b", "c"),
        ],
    }
}

#[allow(dead_code)]
pub fn compile(graph: Graph) -> CompiledWorkflow {
    Compiler::builder(graph).build().compile()
}

#[allow(dead_code)]
pub fn order_of(compiled: &CompiledWorkflow) -> Vec<String> {
    compiled
        .plan
        .steps
        .iter()
        .map(|s| s.node_id.clone())
        .collect()
}

#[allow(dead_code)]
pub fn test_codec() -> FieldCodec {
    FieldCodec::new(MasterKey::new(TEST_MASTER_KEY).expect("valid test key"))
}
