//! Property-based tests for the discovery walk
//!
//! Random adjacency maps, including cycles and self-references, checked
//! against a naive fixpoint reachability computation.

use proptest::prelude::*;
use sieve_discovery::discover;
use std::collections::{HashMap, HashSet};

fn graph_strategy() -> impl Strategy<Value = HashMap<String, Vec<String>>> {
    (1usize..12).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0..n, 0..4), n).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, targets)| {
                    (
                        format!("T{}", i),
                        targets.into_iter().map(|t| format!("T{}", t)).collect(),
                    )
                })
                .collect()
        })
    })
}

fn reachable(graph: &HashMap<String, Vec<String>>, root: &str) -> HashSet<String> {
    let mut set: HashSet<String> = HashSet::from([root.to_string()]);
    loop {
        let next: HashSet<String> = set
            .iter()
            .flat_map(|id| graph[id].iter().cloned())
            .collect();
        let before = set.len();
        set.extend(next);
        if set.len() == before {
            return set;
        }
    }
}

proptest! {
    /// Property: the walk finds exactly the reachable types
    #[test]
    fn discovers_exactly_reachable(graph in graph_strategy()) {
        let found = discover(&["T0"], &graph).unwrap();
        let found_set: HashSet<String> = found.iter().map(String::from).collect();
        prop_assert_eq!(found_set, reachable(&graph, "T0"));
    }

    /// Property: no type is emitted twice, and the root comes first
    #[test]
    fn each_type_emitted_once(graph in graph_strategy()) {
        let found = discover(&["T0"], &graph).unwrap();
        let unique: HashSet<&str> = found.iter().collect();
        prop_assert_eq!(unique.len(), found.len());
        prop_assert_eq!(found.types().first().map(String::as_str), Some("T0"));
    }

    /// Property: the walk is deterministic
    #[test]
    fn walk_is_deterministic(graph in graph_strategy()) {
        let a = discover(&["T0"], &graph).unwrap();
        let b = discover(&["T0"], &graph).unwrap();
        prop_assert_eq!(a.types(), b.types());
    }
}
