use crate::graph::{GraphIndex, Node};
use ahash::AHashSet;
use itertools::Itertools;
use std::collections::VecDeque;
use tracing::debug;

/// Selects the executable nodes that belong to a live workflow.
///
/// A node qualifies when it is reachable from any control node along outgoing edges, or
/// when it shares at least one edge with another executable node. Executable nodes with no
/// such edge are dropped. The result keeps document order.
pub fn filter_executable<'a>(index: &GraphIndex<'a>) -> Vec<&'a Node> {
    let reachable = reachable_from_controls(index);

    let (kept, excluded): (Vec<&'a Node>, Vec<&'a Node>) = index
        .nodes()
        .iter()
        .copied()
        .filter(|node| node.role().is_executable())
        .partition(|node| {
            reachable.contains(node.id.as_str()) || is_locally_connected(index, node)
        });

    if !excluded.is_empty() {
        debug!(
            excluded = %excluded.iter().map(|n| n.id.as_str()).join(", "),
            "excluding isolated executable nodes"
        );
    }
    kept
}

/// Breadth-first walk from every control node, collecting executable nodes on the way.
fn reachable_from_controls<'a>(index: &GraphIndex<'a>) -> AHashSet<&'a str> {
    let mut queue: VecDeque<&'a str> = index
        .nodes()
        .iter()
        .filter(|node| node.role().is_control())
        .map(|node| node.id.as_str())
        .collect();
    let mut visited: AHashSet<&'a str> = AHashSet::new();
    let mut reachable: AHashSet<&'a str> = AHashSet::new();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(node) = index.node(current) {
            if node.role().is_executable() {
                reachable.insert(node.id.as_str());
            }
        }
        for edge in index.outgoing(current) {
            if !visited.contains(edge.target.as_str()) {
                queue.push_back(edge.target.as_str());
            }
        }
    }

    reachable
}

fn is_locally_connected(index: &GraphIndex<'_>, node: &Node) -> bool {
    let is_other_executable = |id: &str| {
        id != node.id
            && index
                .node(id)
                .is_some_and(|other| other.role().is_executable())
    };

    index
        .outgoing(&node.id)
        .iter()
        .any(|edge| is_other_executable(&edge.target))
        || index
            .incoming(&node.id)
            .iter()
            .any(|edge| is_other_executable(&edge.source))
}
