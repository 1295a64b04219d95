//! pcrit core: dependency graph model, query cache, and critical path engine

pub mod cache;
pub mod config;
pub mod critical_path;
pub mod dot;
pub mod error;
pub mod graph;
pub mod model;


#[cfg(test)]
pub mod test_utils;

pub use model::{
    CriticalPath, DepEdge, DepNode, EdgeId, NodeId, PackageMeta, PackageSize, PathSegment,
};
pub use graph::DepGraph;
pub use error::{AnalysisError, Result};
pub use config::{AnalysisConfig, default_workers};
pub use critical_path::{topological_order, longest_paths, trace_critical, mark_critical_path};
pub use dot::{DotOptions, render_dot};
pub use cache::{
    DEFAULT_CACHE_DIR, FINGERPRINT_FILE, Fingerprint, QueryCache, QueryKind, clear_cache,
    sanitize_key,
};
