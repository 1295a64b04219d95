//! Core data structures for the dependency graph

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stable identifier for a node: its insertion index, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub u64);

/// Stable identifier for an edge: its insertion index, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct EdgeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A package in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepNode {
    pub id: NodeId,
    /// Import path; unique across the graph.
    pub identity: String,
    pub label: String,
    /// Part of the toolchain's base library.
    pub standard: bool,
    /// Estimated build cost (archive size), set by weight assignment.
    pub cost: Option<u64>,
    pub num_funcs: Option<u64>,
}

impl DepNode {
    pub fn new(id: NodeId, identity: &str) -> Self {
        DepNode {
            id,
            identity: identity.to_string(),
            label: identity.to_string(),
            standard: false,
            cost: None,
            num_funcs: None,
        }
    }
}

/// "source depends on target".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// The target's estimated cost, set by weight assignment.
    pub weight: Option<u64>,
    /// Set only when the edge lies on the reconstructed critical path.
    pub critical: bool,
}

/// Metadata answer for one package, as reported by `go list -json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
    #[serde(rename = "ImportPath")]
    pub import_path: String,
    #[serde(rename = "Standard", default)]
    pub standard: bool,
    #[serde(rename = "Root", default)]
    pub root: PathBuf,
    #[serde(rename = "Imports", default)]
    pub imports: Vec<String>,
}

/// Compiled size answer for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSize {
    pub size: u64,
    pub num_funcs: u64,
}

/// One step of the critical path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub node: NodeId,
    pub identity: String,
    /// Weight of the edge used to reach this node (0 for the root).
    pub incoming_weight: u64,
    pub cost: u64,
    pub num_funcs: u64,
}

/// The root-to-leaf walk with maximal cumulative cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPath {
    pub segments: Vec<PathSegment>,
    pub total_cost: u64,
}

impl CriticalPath {
    /// Identities along the path, root first.
    pub fn identities(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.identity.as_str()).collect()
    }

    pub fn nodes(&self) -> HashSet<NodeId> {
        self.segments.iter().map(|s| s.node).collect()
    }

    /// One line per segment: `<identity> [weight:<cost> nfuncs:<count>]`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            out.push_str(&format!(
                "{} [weight:{} nfuncs:{}]\n",
                seg.identity, seg.cost, seg.num_funcs
            ));
        }
        out
    }
}
