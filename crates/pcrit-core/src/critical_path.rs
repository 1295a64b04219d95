//! Critical path analysis over the weighted dependency graph.
//!
//! The critical path is the root-to-leaf chain of packages whose summed
//! estimated cost is largest: the packages that must be compiled one after
//! another no matter how many cores the build has.
//!
//! # Algorithm
//!
//! 1. **Topological order**: depth-first postorder from the root over
//!    outgoing (dependency) edges, reversed. Only reachable nodes appear.
//! 2. **Longest path values**: `pathto[n]` starts at `cost(n)`. Walking the
//!    order from the leaves back to the root, every incoming edge
//!    `pred -> cur` raises `pathto[pred]` to `pathto[cur] + cost(pred)` when
//!    that is larger. Afterwards `pathto[n]` is the largest total cost of any
//!    path from `n` down to a leaf.
//! 3. **Reconstruction**: from the root, repeatedly follow the outgoing edge
//!    whose target has the greatest `pathto`, marking it critical, until a
//!    leaf is reached. Equal `pathto` values are broken by the greater
//!    target identity so the result never depends on edge iteration order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::{AnalysisError, Result};
use crate::graph::DepGraph;
use crate::model::{CriticalPath, EdgeId, NodeId, PathSegment};

/// Dependencies of `node` in edge insertion order.
fn successors(graph: &DepGraph, node: NodeId) -> Vec<NodeId> {
    let mut edges: Vec<(EdgeId, NodeId)> = graph
        .edges_from(node)
        .map(|e| (e.id, e.target))
        .collect();
    edges.sort();
    edges.into_iter().map(|(_, target)| target).collect()
}

/// Reverse DFS postorder from `root`: every node precedes its dependencies.
pub fn topological_order(graph: &DepGraph, root: NodeId) -> Result<Vec<NodeId>> {
    graph.require(root)?;

    let mut visited: HashSet<NodeId> = HashSet::with_capacity(graph.node_count());
    let mut postorder: Vec<NodeId> = Vec::with_capacity(graph.node_count());
    // (node, dependencies not yet descended into; popped from the back)
    let mut stack: Vec<(NodeId, Vec<NodeId>)> = Vec::new();

    let mut pending = successors(graph, root);
    pending.reverse();
    visited.insert(root);
    stack.push((root, pending));

    while let Some(top) = stack.last_mut() {
        let node = top.0;
        match top.1.pop() {
            Some(next) => {
                if visited.insert(next) {
                    let mut pending = successors(graph, next);
                    pending.reverse();
                    stack.push((next, pending));
                }
            }
            None => {
                postorder.push(node);
                stack.pop();
            }
        }
    }

    postorder.reverse();
    Ok(postorder)
}

/// Largest total cost from each node in `order` down to a leaf.
pub fn longest_paths(graph: &DepGraph, order: &[NodeId]) -> Result<HashMap<NodeId, u64>> {
    let mut pathto: HashMap<NodeId, u64> = HashMap::with_capacity(order.len());
    for &node in order {
        pathto.insert(node, graph.cost_of(node)?);
    }

    for &cur in order.iter().rev() {
        let to_cur = pathto[&cur];
        for edge in graph.edges_to(cur) {
            let pred = edge.source;
            // Dependents outside the reachable set do not take part.
            let Some(&current) = pathto.get(&pred) else {
                continue;
            };
            let candidate = to_cur.saturating_add(graph.cost_of(pred)?);
            if candidate > current {
                tracing::trace!("pathto[{}] = {} via {}", pred, candidate, cur);
                pathto.insert(pred, candidate);
            }
        }
    }

    Ok(pathto)
}

fn segment(graph: &DepGraph, node: NodeId, incoming_weight: u64) -> Result<PathSegment> {
    let dep = graph.require(node)?;
    Ok(PathSegment {
        node,
        identity: dep.identity.clone(),
        incoming_weight,
        cost: graph.cost_of(node)?,
        num_funcs: dep.num_funcs.unwrap_or(0),
    })
}

struct Candidate<'a> {
    pathto: u64,
    identity: &'a str,
    edge: EdgeId,
    target: NodeId,
    weight: Option<u64>,
}

fn rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    (a.pathto, a.identity).cmp(&(b.pathto, b.identity))
}

/// Walk from `root` along the heaviest dependencies, marking each traversed
/// edge critical.
pub fn trace_critical(
    graph: &mut DepGraph,
    root: NodeId,
    pathto: &HashMap<NodeId, u64>,
) -> Result<CriticalPath> {
    let mut segments = vec![segment(graph, root, 0)?];
    let mut cur = root;

    loop {
        let mut candidates = Vec::new();
        for edge in graph.edges_from(cur) {
            let target = graph.require(edge.target)?;
            let pt = pathto.get(&edge.target).copied().ok_or_else(|| {
                AnalysisError::internal(format!("no path value for {}", target.identity))
            })?;
            candidates.push(Candidate {
                pathto: pt,
                identity: &target.identity,
                edge: edge.id,
                target: edge.target,
                weight: edge.weight,
            });
        }

        let Some(best) = candidates.into_iter().max_by(rank) else {
            break;
        };
        if best.pathto == 0 {
            return Err(AnalysisError::internal(format!(
                "best successor {} of {} has zero path cost",
                best.identity, cur
            )));
        }
        let weight = best.weight.ok_or_else(|| {
            AnalysisError::internal(format!("edge {} -> {} has no weight", cur, best.target))
        })?;
        let (edge, next) = (best.edge, best.target);

        if segments.len() > graph.node_count() {
            return Err(AnalysisError::internal(format!(
                "critical path revisits {next}; dependency graph has a cycle"
            )));
        }
        if let Some(e) = graph.edge_mut(edge) {
            e.critical = true;
        }
        segments.push(segment(graph, next, weight)?);
        cur = next;
    }

    let total_cost = segments.iter().map(|s| s.cost).sum();
    Ok(CriticalPath {
        segments,
        total_cost,
    })
}

/// Run all three passes and mark the critical edges in `graph`.
pub fn mark_critical_path(graph: &mut DepGraph, root: NodeId) -> Result<CriticalPath> {
    let order = topological_order(graph, root)?;
    tracing::debug!("topological order covers {} nodes", order.len());

    let pathto = longest_paths(graph, &order)?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let mut ranked: Vec<(NodeId, u64)> = pathto.iter().map(|(&n, &pt)| (n, pt)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        tracing::debug!("nodes with pathto values:");
        for (rank, (node, pt)) in ranked.iter().enumerate() {
            if let Some(dep) = graph.node(*node) {
                tracing::debug!(
                    "{}: {} sz={} nf={} pt={} {}",
                    rank,
                    node,
                    dep.cost.unwrap_or(0),
                    dep.num_funcs.unwrap_or(0),
                    pt,
                    dep.identity
                );
            }
        }
    }

    let path = trace_critical(graph, root, &pathto)?;
    tracing::info!(
        "critical path: {} packages, total cost {}",
        path.segments.len(),
        path.total_cost
    );
    Ok(path)
}
