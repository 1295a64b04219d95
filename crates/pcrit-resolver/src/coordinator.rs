//! Orchestrates one analysis run

use pcrit_core::{
    AnalysisConfig, CriticalPath, DepGraph, NodeId, QueryKind, Result, mark_critical_path,
};

use crate::builder::GraphBuilder;
use crate::pool::WorkerPool;
use crate::queries::CachedQueries;
use crate::weights::assign_weights;

/// Output of a completed run.
#[derive(Debug)]
pub struct Analysis {
    pub graph: DepGraph,
    pub root: NodeId,
    pub critical_path: CriticalPath,
}

pub struct Coordinator<'a> {
    queries: &'a CachedQueries,
    config: &'a AnalysisConfig,
}

impl<'a> Coordinator<'a> {
    pub fn new(queries: &'a CachedQueries, config: &'a AnalysisConfig) -> Self {
        Coordinator { queries, config }
    }

    /// Build the graph for `target`, weight it, and find its critical path.
    /// The rendered path is also stored in the cache under the target.
    pub fn run(&self, target: &str) -> Result<Analysis> {
        let (mut graph, root) = {
            let pool = WorkerPool::new(self.config.workers)?;
            let mut builder = GraphBuilder::new(self.queries, &pool, self.config);
            let root = builder.populate(target)?;
            (builder.into_graph(), root)
        };

        let size_pool = WorkerPool::new(self.config.size_workers())?;
        assign_weights(&mut graph, self.queries, &size_pool)?;

        let critical_path = mark_critical_path(&mut graph, root)?;
        self.queries
            .cache()
            .put(QueryKind::CriticalPath, target, critical_path.render().as_bytes())?;

        Ok(Analysis {
            graph,
            root,
            critical_path,
        })
    }
}
