//! Graph wrapper using petgraph::StableDiGraph with custom NodeId/EdgeId

use crate::error::{AnalysisError, Result};
use crate::model::*;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// The package dependency graph. Nodes are never removed, so indices are
/// assigned in insertion order and stay valid for the life of the graph.
pub struct DepGraph {
    inner: StableDiGraph<DepNode, DepEdge>,
    by_identity: HashMap<String, NodeId>,
}

impl std::fmt::Debug for DepGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl DepGraph {
    pub fn new() -> Self {
        DepGraph {
            inner: StableDiGraph::new(),
            by_identity: HashMap::new(),
        }
    }

    /// Insert a node for `identity`. Inserting the same identity twice is a
    /// defect in the caller.
    pub fn add_node(&mut self, identity: &str) -> Result<NodeId> {
        if self.by_identity.contains_key(identity) {
            return Err(AnalysisError::internal(format!(
                "node for {identity} inserted twice"
            )));
        }
        let next = NodeId(self.inner.node_count() as u64);
        let idx = self.inner.add_node(DepNode::new(next, identity));
        let id = NodeId(idx.index() as u64);
        debug_assert_eq!(id, next);
        self.by_identity.insert(identity.to_string(), id);
        Ok(id)
    }

    /// Add "source depends on target". Returns assigned EdgeId.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId> {
        self.require(source)?;
        self.require(target)?;
        let next = EdgeId(self.inner.edge_count() as u64);
        let edge = DepEdge {
            id: next,
            source,
            target,
            weight: None,
            critical: false,
        };
        let idx = self
            .inner
            .add_edge(Self::index(source), Self::index(target), edge);
        Ok(EdgeId(idx.index() as u64))
    }

    fn index(id: NodeId) -> NodeIndex {
        NodeIndex::new(id.0 as usize)
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&DepNode> {
        self.inner.node_weight(Self::index(id))
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DepNode> {
        self.inner.node_weight_mut(Self::index(id))
    }

    /// Like [`DepGraph::node`], but an unknown id is an internal error.
    pub fn require(&self, id: NodeId) -> Result<&DepNode> {
        self.node(id)
            .ok_or_else(|| AnalysisError::internal(format!("unknown node {id}")))
    }

    /// Get an edge by ID.
    pub fn edge(&self, id: EdgeId) -> Option<&DepEdge> {
        self.inner.edge_weight(EdgeIndex::new(id.0 as usize))
    }

    /// Get a mutable edge by ID.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut DepEdge> {
        self.inner.edge_weight_mut(EdgeIndex::new(id.0 as usize))
    }

    /// Look up the node for an identity.
    pub fn lookup(&self, identity: &str) -> Option<NodeId> {
        self.by_identity.get(identity).copied()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.by_identity.contains_key(identity)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &DepNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges in insertion order.
    pub fn all_edges(&self) -> impl Iterator<Item = &DepEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.inner
            .edge_indices()
            .map(|idx| EdgeId(idx.index() as u64))
            .collect()
    }

    /// Get all outgoing edges from a node (its dependencies).
    pub fn edges_from(&self, source: NodeId) -> impl Iterator<Item = &DepEdge> {
        self.inner
            .edges_directed(Self::index(source), Direction::Outgoing)
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    /// Get all incoming edges to a node (its dependents).
    pub fn edges_to(&self, target: NodeId) -> impl Iterator<Item = &DepEdge> {
        self.inner
            .edges_directed(Self::index(target), Direction::Incoming)
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    pub fn has_edge_between(&self, source: NodeId, target: NodeId) -> bool {
        self.edges_from(source).any(|e| e.target == target)
    }

    /// Estimated cost of a node; missing costs mean weight assignment never ran.
    pub fn cost_of(&self, id: NodeId) -> Result<u64> {
        let node = self.require(id)?;
        node.cost.ok_or_else(|| {
            AnalysisError::internal(format!("no estimated cost for {}", node.identity))
        })
    }
}

impl Default for DepGraph {
    fn default() -> Self {
        Self::new()
    }
}
