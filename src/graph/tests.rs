use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use super::*;
use crate::error::ErrorKind;

fn graph(entries: &[(&str, &[&str])]) -> DependencyGraph {
    DependencyGraph::new(
        entries
            .iter()
            .map(|(node, prereqs)| {
                (
                    (*node).to_owned(),
                    prereqs.iter().map(|p| (*p).to_owned()).collect(),
                )
            })
            .collect(),
    )
}

fn sorted_levels(g: &DependencyGraph) -> Vec<Vec<String>> {
    let mut levels = g.execution_levels().unwrap();
    for level in &mut levels {
        level.sort();
    }
    levels
}

#[test]
fn empty_graph_yields_no_levels() {
    let g = DependencyGraph::new(HashMap::new());
    assert!(g.execution_levels().unwrap().is_empty());
}

#[test]
fn single_node_without_dependencies() {
    let g = graph(&[("nodeA", &[])]);
    assert_eq!(sorted_levels(&g), [vec!["nodeA"]]);
}

#[test]
fn independent_nodes_share_a_level() {
    let g = graph(&[("nodeA", &[]), ("nodeB", &[])]);
    assert_eq!(sorted_levels(&g), [vec!["nodeA", "nodeB"]]);
}

#[test]
fn chains_produce_one_level_per_node() {
    let g = graph(&[("nodeA", &[]), ("nodeB", &["nodeA"]), ("nodeC", &["nodeB"])]);
    assert_eq!(
        sorted_levels(&g),
        [vec!["nodeA"], vec!["nodeB"], vec!["nodeC"]]
    );
}

#[test]
fn diamond_pattern() {
    let g = graph(&[
        ("nodeA", &[]),
        ("nodeB", &[]),
        ("nodeC", &["nodeA", "nodeB"]),
        ("nodeD", &["nodeC"]),
    ]);
    assert_eq!(
        sorted_levels(&g),
        [vec!["nodeA", "nodeB"], vec!["nodeC"], vec!["nodeD"]]
    );
}

#[test]
fn report_pipeline_levels() {
    let g = graph(&[
        ("fetchUser", &[]),
        ("fetchOrders", &[]),
        ("createReport", &["fetchUser", "fetchOrders"]),
        ("processData", &["createReport"]),
        ("sendEmail", &["createReport"]),
        ("notify", &["processData", "sendEmail"]),
    ]);
    assert_eq!(
        sorted_levels(&g),
        [
            vec!["fetchOrders", "fetchUser"],
            vec!["createReport"],
            vec!["processData", "sendEmail"],
            vec!["notify"],
        ]
    );
}

#[test]
fn wide_fan_out() {
    let g = graph(&[
        ("root", &[]),
        ("child1", &["root"]),
        ("child2", &["root"]),
        ("child3", &["root"]),
        ("child4", &["root"]),
        ("child5", &["root"]),
    ]);
    assert_eq!(
        sorted_levels(&g),
        [
            vec!["root"],
            vec!["child1", "child2", "child3", "child4", "child5"],
        ]
    );
}

#[test]
fn wide_fan_in() {
    let g = graph(&[
        ("source1", &[]),
        ("source2", &[]),
        ("source3", &[]),
        ("collector", &["source1", "source2", "source3"]),
    ]);
    assert_eq!(
        sorted_levels(&g),
        [vec!["source1", "source2", "source3"], vec!["collector"]]
    );
}

#[test]
fn mixed_chains_and_diamonds() {
    let g = graph(&[
        ("nodeA", &[]),
        ("nodeB", &["nodeA"]),
        ("nodeC", &["nodeB"]),
        ("nodeD", &[]),
        ("nodeE", &[]),
        ("nodeF", &["nodeD", "nodeE"]),
        ("nodeG", &["nodeF"]),
        ("nodeH", &["nodeC", "nodeG"]),
    ]);
    assert_eq!(
        sorted_levels(&g),
        [
            vec!["nodeA", "nodeD", "nodeE"],
            vec!["nodeB", "nodeF"],
            vec!["nodeC", "nodeG"],
            vec!["nodeH"],
        ]
    );
}

#[test]
fn two_node_cycle_is_rejected() {
    let g = graph(&[("nodeA", &["nodeB"]), ("nodeB", &["nodeA"])]);
    let err = g.execution_levels().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
}

#[test]
fn three_node_cycle_is_rejected() {
    let g = graph(&[
        ("nodeA", &["nodeB"]),
        ("nodeB", &["nodeC"]),
        ("nodeC", &["nodeA"]),
    ]);
    let err = g.execution_levels().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
}

#[test]
fn self_dependency_is_a_cycle() {
    let g = graph(&[("nodeA", &["nodeA"])]);
    let err = g.execution_levels().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
}

#[test]
fn cycle_buried_in_a_larger_graph_is_rejected() {
    let g = graph(&[
        ("nodeA", &[]),
        ("nodeB", &["nodeA", "nodeE"]),
        ("nodeC", &["nodeB"]),
        ("nodeD", &["nodeC"]),
        ("nodeE", &["nodeD", "nodeB"]),
    ]);
    let err = g.execution_levels().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
}

#[test]
fn missing_dependency_names_both_nodes() {
    let g = graph(&[("nodeA", &["nonExistentNode"])]);
    let err = g.execution_levels().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingDependency);
    let display = err.to_string();
    assert!(display.contains("nodeA"));
    assert!(display.contains("nonExistentNode"));
}

#[test]
fn duplicate_prerequisites_still_schedule() {
    let g = graph(&[("nodeA", &[]), ("nodeB", &["nodeA", "nodeA"])]);
    assert_eq!(sorted_levels(&g), [vec!["nodeA"], vec!["nodeB"]]);
}

#[test]
fn disconnected_chains_interleave_by_depth() {
    let g = graph(&[
        ("chainA1", &[]),
        ("chainA2", &["chainA1"]),
        ("chainB1", &[]),
        ("chainB2", &["chainB1"]),
        ("chainB3", &["chainB2"]),
    ]);
    assert_eq!(
        sorted_levels(&g),
        [
            vec!["chainA1", "chainB1"],
            vec!["chainA2", "chainB2"],
            vec!["chainB3"],
        ]
    );
}

// Random acyclic graphs: node i may only depend on earlier nodes, so the
// generated graph is a DAG by construction.
fn arb_dag() -> impl Strategy<Value = HashMap<String, Vec<String>>> {
    (2usize..8).prop_flat_map(|n| {
        let per_node: Vec<BoxedStrategy<Vec<usize>>> = (0..n)
            .map(|i| {
                if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    prop::collection::vec(0..i, 0..=i.min(3)).boxed()
                }
            })
            .collect();
        per_node.prop_map(move |deps| {
            (0..n)
                .map(|i| {
                    (
                        format!("n{i}"),
                        deps[i].iter().map(|j| format!("n{j}")).collect(),
                    )
                })
                .collect()
        })
    })
}

proptest! {
    #[test]
    fn levels_respect_every_edge(deps in arb_dag()) {
        let g = DependencyGraph::new(deps.clone());
        let levels = g.execution_levels().unwrap();

        let mut level_of = HashMap::new();
        for (i, level) in levels.iter().enumerate() {
            for node in level {
                level_of.insert(node.clone(), i);
            }
        }

        for (node, prereqs) in &deps {
            for prereq in prereqs {
                prop_assert!(level_of[prereq] < level_of[node]);
            }
        }
    }

    #[test]
    fn levels_are_a_permutation_of_the_nodes(deps in arb_dag()) {
        let g = DependencyGraph::new(deps.clone());
        let levels = g.execution_levels().unwrap();

        let emitted: Vec<_> = levels.iter().flatten().cloned().collect();
        let unique: HashSet<_> = emitted.iter().cloned().collect();
        prop_assert_eq!(emitted.len(), unique.len());
        prop_assert_eq!(unique, deps.keys().cloned().collect::<HashSet<_>>());
    }

    #[test]
    fn ring_graphs_always_fail_with_a_cycle(n in 2usize..8) {
        let deps: HashMap<String, Vec<String>> = (0..n)
            .map(|i| (format!("n{i}"), vec![format!("n{}", (i + 1) % n)]))
            .collect();
        let err = DependencyGraph::new(deps).execution_levels().unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::CyclicDependency);
    }
}
