//! Dependency graph discovery
//!
//! The graph is only ever mutated from the calling thread. Worker batches
//! touch nothing but the query cache, which lets later sequential lookups
//! hit memory instead of the toolchain.

use pcrit_core::{AnalysisConfig, DepGraph, NodeId, Result};

use crate::pool::WorkerPool;
use crate::queries::CachedQueries;

pub struct GraphBuilder<'a> {
    queries: &'a CachedQueries,
    pool: &'a WorkerPool,
    config: &'a AnalysisConfig,
    graph: DepGraph,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        queries: &'a CachedQueries,
        pool: &'a WorkerPool,
        config: &'a AnalysisConfig,
    ) -> Self {
        GraphBuilder {
            queries,
            pool,
            config,
            graph: DepGraph::new(),
        }
    }

    /// Discover the transitive dependencies of `root`. Any failed query
    /// aborts the whole population.
    pub fn populate(&mut self, root: &str) -> Result<NodeId> {
        tracing::info!("populating dependency graph for {}", root);
        let id = self.populate_node(root)?;
        tracing::info!(
            "graph has {} nodes, {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        Ok(id)
    }

    fn populate_node(&mut self, identity: &str) -> Result<NodeId> {
        tracing::debug!("populate {}", identity);
        // Inserted before any dependency is examined, so a shared dependency
        // reached again later is already present.
        let id = self.graph.add_node(identity)?;

        let meta = self.queries.package(identity)?;
        if let Some(node) = self.graph.node_mut(id) {
            node.standard = meta.standard;
        }

        let deps: Vec<&str> = meta
            .imports
            .iter()
            .map(String::as_str)
            .filter(|dep| !self.config.is_pseudo(dep))
            .collect();

        tracing::debug!("warming {} deps of {} in parallel", deps.len(), identity);
        let queries = self.queries;
        self.pool.run_batch(&deps, |dep| {
            if let Err(e) = queries.package(dep) {
                // Resurfaces below when the dependency is resolved for real.
                tracing::debug!("warm-up of {} failed: {}", dep, e);
            }
        });

        for dep in deps {
            let dep_meta = self.queries.package(dep)?;
            if self.config.skip_standard && dep_meta.standard {
                continue;
            }
            let dep_id = match self.graph.lookup(dep) {
                Some(existing) => existing,
                None => self.populate_node(dep)?,
            };
            self.graph.add_edge(id, dep_id)?;
        }

        Ok(id)
    }

    pub fn into_graph(self) -> DepGraph {
        self.graph
    }
}
