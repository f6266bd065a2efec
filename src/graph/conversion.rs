use super::definition::Graph;
use crate::error::GraphError;

/// A trait for custom canvas formats that can be converted into a flowplan `Graph`.
///
/// Canvas libraries tend to wrap nodes in layout data (positions, selection state,
/// styling). Implement this on your own deserialization structs to strip that down to
/// the id/type/data and source/target/handle fields the compiler needs.
///
/// # Example
///
/// ```rust,no_run
/// use flowplan::error::GraphError;
/// use flowplan::graph::{Edge, Graph, IntoGraph, Node};
///
/// struct MyBox { key: String, kind: String }
/// struct MyCanvas { boxes: Vec<MyBox>, wires: Vec<(String, String)> }
///
/// impl IntoGraph for MyCanvas {
///     fn into_graph(self) -> Result<Graph, GraphError> {
///         Ok(Graph {
///             nodes: self.boxes.into_iter().map(|b| Node::new(b.key, b.kind)).collect(),
///             edges: self.wires.into_iter().map(|(s, t)| Edge::new(s, t)).collect(),
///         })
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a compilable graph.
    fn into_graph(self) -> Result<Graph, GraphError>;
}

impl IntoGraph for Graph {
    fn into_graph(self) -> Result<Graph, GraphError> {
        Ok(self)
    }
}
