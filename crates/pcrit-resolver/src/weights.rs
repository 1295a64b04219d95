//! Edge weight assignment from package sizes

use pcrit_core::{DepGraph, Result};

use crate::pool::WorkerPool;
use crate::queries::CachedQueries;

/// Measure every package in parallel, then (single-threaded) record each
/// node's cost and weight every edge `A -> B` with B's cost. Costs are at
/// least 1.
pub fn assign_weights(
    graph: &mut DepGraph,
    queries: &CachedQueries,
    pool: &WorkerPool,
) -> Result<()> {
    let identities: Vec<String> = graph.all_nodes().map(|n| n.identity.clone()).collect();
    tracing::info!(
        "measuring {} packages with {} workers",
        identities.len(),
        pool.workers()
    );

    pool.try_run_batch(&identities, |identity| queries.size(identity).map(drop))?;

    tracing::info!("package sizes ready, applying edge weights");
    for identity in &identities {
        let size = queries.size(identity)?;
        let Some(id) = graph.lookup(identity) else {
            continue;
        };
        if let Some(node) = graph.node_mut(id) {
            // Built-in packages measure 0; every node still costs something
            node.cost = Some(size.size.max(1));
            node.num_funcs = Some(size.num_funcs);
        }
    }

    for edge_id in graph.edge_ids() {
        let Some(edge) = graph.edge(edge_id) else {
            continue;
        };
        let (source, target) = (edge.source, edge.target);
        let cost = graph.cost_of(target)?;
        tracing::trace!("weight {} -> {} = {}", source, target, cost);
        if let Some(edge) = graph.edge_mut(edge_id) {
            edge.weight = Some(cost);
        }
    }

    Ok(())
}
