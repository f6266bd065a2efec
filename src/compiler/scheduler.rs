use crate::graph::{GraphIndex, Node};
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, warn};

/// A non-fatal observation made while ordering nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingWarning {
    /// The ready queue ran dry with nodes left over (a cycle, or no natural root), so
    /// `node_id` was scheduled while `unmet_dependencies` of its inputs were still pending.
    CycleBroken {
        node_id: String,
        unmet_dependencies: usize,
    },
}

impl fmt::Display for SchedulingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingWarning::CycleBroken {
                node_id,
                unmet_dependencies,
            } => write!(
                f,
                "cycle broken at node '{}' ({} unmet dependencies)",
                node_id, unmet_dependencies
            ),
        }
    }
}

/// The scheduler's output: a total order over the filtered nodes.
#[derive(Debug, Clone)]
pub struct Schedule<'a> {
    pub order: Vec<&'a Node>,
    pub warnings: Vec<SchedulingWarning>,
}

/// Orders `filtered` with Kahn's algorithm, counting only edges between its members.
///
/// Ties are broken by the position in `filtered`. When no node is ready but some remain,
/// the earliest remaining node is forced into the queue and a `CycleBroken` warning is
/// recorded. The result is always a permutation of `filtered`.
pub fn schedule<'a>(index: &GraphIndex<'a>, filtered: &[&'a Node]) -> Schedule<'a> {
    let mut in_degree: AHashMap<&str, usize> =
        filtered.iter().map(|n| (n.id.as_str(), 0)).collect();
    for node in filtered {
        for edge in index.outgoing(&node.id) {
            if let Some(degree) = in_degree.get_mut(edge.target.as_str()) {
                *degree += 1;
            }
        }
    }

    let mut queue: VecDeque<&'a Node> = filtered
        .iter()
        .copied()
        .filter(|n| in_degree[n.id.as_str()] == 0)
        .collect();

    let mut visited: AHashSet<&str> = AHashSet::with_capacity(filtered.len());
    let mut order: Vec<&'a Node> = Vec::with_capacity(filtered.len());
    let mut warnings = Vec::new();
    let mut reseed_cursor = 0;

    loop {
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node.id.as_str()) {
                continue;
            }
            order.push(node);

            for edge in index.outgoing(&node.id) {
                let Some(degree) = in_degree.get_mut(edge.target.as_str()) else {
                    continue;
                };
                if *degree == 0 {
                    continue;
                }
                *degree -= 1;
                if *degree == 0 {
                    if let Some(successor) = index.node(&edge.target) {
                        queue.push_back(successor);
                    }
                }
            }
        }

        while filtered
            .get(reseed_cursor)
            .is_some_and(|n| visited.contains(n.id.as_str()))
        {
            reseed_cursor += 1;
        }
        let Some(&forced) = filtered.get(reseed_cursor) else {
            break;
        };

        let unmet = in_degree[forced.id.as_str()];
        warn!(
            node_id = %forced.id,
            unmet_dependencies = unmet,
            "no ready node left, breaking cycle"
        );
        warnings.push(SchedulingWarning::CycleBroken {
            node_id: forced.id.clone(),
            unmet_dependencies: unmet,
        });
        queue.push_back(forced);
    }

    debug!(
        scheduled = order.len(),
        cycles_broken = warnings.len(),
        "scheduled executable nodes"
    );

    Schedule { order, warnings }
}
