//! Test utilities for building weighted dependency graphs

use crate::graph::DepGraph;
use crate::model::NodeId;

/// Build a graph from `(dependent, dependency)` pairs and per-identity costs,
/// with edge weights filled in the way weight assignment would.
///
/// Nodes are inserted in first-seen order; the first identity in `edges`
/// (or in `costs` when there are no edges) is returned as the root.
pub fn weighted_graph(edges: &[(&str, &str)], costs: &[(&str, u64)]) -> (DepGraph, NodeId) {
    let mut graph = DepGraph::new();

    let root_identity = edges.first().map(|e| e.0).unwrap_or_else(|| costs[0].0);
    let root = ensure(&mut graph, root_identity);
    for (from, to) in edges {
        let a = ensure(&mut graph, from);
        let b = ensure(&mut graph, to);
        graph.add_edge(a, b).unwrap();
    }
    for (identity, _) in costs {
        ensure(&mut graph, identity);
    }

    for (identity, cost) in costs {
        let id = graph.lookup(identity).unwrap();
        let node = graph.node_mut(id).unwrap();
        node.cost = Some(*cost);
        node.num_funcs = Some(cost / 10);
    }
    apply_edge_weights(&mut graph);

    (graph, root)
}

fn ensure(graph: &mut DepGraph, identity: &str) -> NodeId {
    match graph.lookup(identity) {
        Some(id) => id,
        None => graph.add_node(identity).unwrap(),
    }
}

/// Set every edge's weight to its target's cost.
pub fn apply_edge_weights(graph: &mut DepGraph) {
    for id in graph.edge_ids() {
        let target = graph.edge(id).unwrap().target;
        let cost = graph.node(target).unwrap().cost;
        graph.edge_mut(id).unwrap().weight = cost;
    }
}

/// Look up a node that must exist.
pub fn id(graph: &DepGraph, identity: &str) -> NodeId {
    graph.lookup(identity).unwrap()
}

/// The worked example: P->{Q,R}, Q->{S,T}, R->{T}.
pub fn diamond(s_cost: u64) -> (DepGraph, NodeId) {
    weighted_graph(
        &[("P", "Q"), ("P", "R"), ("Q", "S"), ("Q", "T"), ("R", "T")],
        &[("P", 10), ("Q", 11), ("R", 11), ("S", s_cost), ("T", 29)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_graph_fixture() {
        let (graph, root) = diamond(3);
        assert_eq!(graph.node(root).unwrap().identity, "P");
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 5);
        assert!(graph.all_edges().all(|e| e.weight.is_some()));
    }
}
