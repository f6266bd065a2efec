//! Tests for topological ordering and cycle breaking.
mod common;
use common::*;
use flowplan::compiler::{reachability, scheduler};
use flowplan::prelude::*;
use proptest::prelude::*;

fn position(order: &[String], id: &str) -> usize {
    order
        .iter()
        .position(|n| n == id)
        .unwrap_or_else(|| panic!("{} not scheduled", id))
}

#[test]
fn test_dependencies_run_first() {
    let g = graph(
        &[("d", "claude"), ("b", "gemini"), ("c", "openai"), ("a", "openai")],
        &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
    );
    let order = order_of(&compile(g));

    assert_eq!(order, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_ties_follow_document_order() {
    let g = graph(
        &[("z", "openai"), ("y", "openai"), ("x", "openai")],
        &[("z", "x"), ("y", "x")],
    );
    let order = order_of(&compile(g));

    assert_eq!(order, vec!["z", "y", "x"]);
}

#[test]
fn test_cycle_is_broken_with_warning() {
    let g = graph(
        &[("a", "openai"), ("b", "gemini"), ("c", "claude")],
        &[("a", "b"), ("b", "c"), ("c", "a")],
    );
    let compiled = compile(g);

    assert_eq!(order_of(&compiled), vec!["a", "b", "c"]);
    assert_eq!(
        compiled.warnings,
        vec![SchedulingWarning::CycleBroken {
            node_id: "a".to_string(),
            unmet_dependencies: 1,
        }]
    );
    assert!(compiled.had_cycles());
    assert!(compiled.warnings[0].to_string().contains("'a'"));
}

#[test]
fn test_cycle_downstream_of_a_root() {
    // r -> a <-> b -> t
    let g = graph(
        &[("r", "openai"), ("a", "gemini"), ("b", "claude"), ("t", "webhook")],
        &[("r", "a"), ("a", "b"), ("b", "a"), ("b", "t")],
    );
    let compiled = compile(g);

    assert_eq!(order_of(&compiled), vec!["r", "a", "b", "t"]);
    assert_eq!(compiled.warnings.len(), 1);
}

#[test]
fn test_edges_outside_the_filtered_set_are_ignored() {
    // The control node's edge must not count as an unmet dependency.
    let g = graph(
        &[("in", "input"), ("a", "openai"), ("b", "gemini")],
        &[("in", "b"), ("b", "a")],
    );
    let compiled = compile(g);

    assert_eq!(order_of(&compiled), vec!["b", "a"]);
    assert!(compiled.warnings.is_empty());
}

#[test]
fn test_schedule_directly_on_index() {
    let g = graph(&[("a", "openai"), ("b", "openai")], &[("b", "a")]);
    let index = GraphIndex::new(&g);
    let filtered = reachability::filter_executable(&index);
    let schedule = scheduler::schedule(&index, &filtered);

    let ids: Vec<&str> = schedule.order.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert!(schedule.warnings.is_empty());
}

fn arb_graph() -> impl Strategy<Value = Graph> {
    (2usize..12).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..n * 3);
        (Just(n), edges, any::<bool>())
    })
    .prop_map(|(n, edges, acyclic)| {
        let nodes = (0..n)
            .map(|i| Node::new(format!("n{}", i), "openai"))
            .collect();
        let edges = edges
            .into_iter()
            .filter(|(s, t)| !acyclic || s < t)
            .map(|(s, t)| Edge::new(format!("n{}", s), format!("n{}", t)))
            .collect();
        Graph { nodes, edges }
    })
}

proptest! {
    #[test]
    fn prop_schedule_is_a_permutation_of_the_filtered_set(g in arb_graph()) {
        let index = GraphIndex::new(&g);
        let filtered = reachability::filter_executable(&index);
        let schedule = scheduler::schedule(&index, &filtered);

        let mut scheduled: Vec<&str> = schedule.order.iter().map(|n| n.id.as_str()).collect();
        let mut expected: Vec<&str> = filtered.iter().map(|n| n.id.as_str()).collect();
        scheduled.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(scheduled, expected);
    }

    #[test]
    fn prop_acyclic_edges_are_respected(g in arb_graph()) {
        let compiled = compile(g.clone());
        let order = order_of(&compiled);

        if compiled.warnings.is_empty() {
            for edge in &g.edges {
                if order.contains(&edge.source) && order.contains(&edge.target) {
                    prop_assert!(position(&order, &edge.source) < position(&order, &edge.target));
                }
            }
        }
    }

    #[test]
    fn prop_forward_only_graphs_never_break_cycles(n in 2usize..10) {
        let nodes: Vec<(String, &str)> = (0..n).map(|i| (format!("n{}", i), "gemini")).collect();
        let g = Graph {
            nodes: nodes.iter().map(|(id, ty)| Node::new(id.as_str(), *ty)).collect(),
            edges: (1..n).map(|i| Edge::new(format!("n{}", i - 1), format!("n{}", i))).collect(),
        };
        let compiled = compile(g);

        prop_assert!(compiled.warnings.is_empty());
        prop_assert_eq!(compiled.plan.len(), n);
    }
}
