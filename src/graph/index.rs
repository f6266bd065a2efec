use super::definition::{Edge, Graph, Node};
use ahash::AHashMap;
use tracing::{debug, warn};

/// Read-only adjacency view over a `Graph`.
///
/// Building the index is where structural problems are absorbed: nodes without a type are
/// skipped, a node id seen twice keeps its first definition, and edges whose endpoints do
/// not exist are dropped.
pub struct GraphIndex<'a> {
    ordered: Vec<&'a Node>,
    by_id: AHashMap<&'a str, &'a Node>,
    outgoing: AHashMap<&'a str, Vec<&'a Edge>>,
    incoming: AHashMap<&'a str, Vec<&'a Edge>>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let mut ordered = Vec::with_capacity(graph.nodes.len());
        let mut by_id: AHashMap<&'a str, &'a Node> = AHashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            if node.node_type.trim().is_empty() {
                debug!(node_id = %node.id, "skipping node without a type");
                continue;
            }
            if by_id.contains_key(node.id.as_str()) {
                warn!(node_id = %node.id, "duplicate node id, keeping the first definition");
                continue;
            }
            by_id.insert(node.id.as_str(), node);
            ordered.push(node);
        }

        let mut outgoing: AHashMap<&'a str, Vec<&'a Edge>> = AHashMap::new();
        let mut incoming: AHashMap<&'a str, Vec<&'a Edge>> = AHashMap::new();
        for edge in &graph.edges {
            let known = |id: &str| by_id.contains_key(id);
            if !known(&edge.source) || !known(&edge.target) {
                debug!(source = %edge.source, target = %edge.target, "ignoring dangling edge");
                continue;
            }
            outgoing.entry(edge.source.as_str()).or_default().push(edge);
            incoming.entry(edge.target.as_str()).or_default().push(edge);
        }

        Self {
            ordered,
            by_id,
            outgoing,
            incoming,
        }
    }

    /// Nodes in document order, duplicates removed.
    pub fn nodes(&self) -> &[&'a Node] {
        &self.ordered
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.by_id.get(id).copied()
    }

    /// Edges leaving `id`, in document order.
    pub fn outgoing(&self, id: &str) -> &[&'a Edge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edges entering `id`, in document order.
    pub fn incoming(&self, id: &str) -> &[&'a Edge] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}
