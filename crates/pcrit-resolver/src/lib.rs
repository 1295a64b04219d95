//! Toolchain queries, graph discovery, and run orchestration

pub mod builder;
pub mod coordinator;
pub mod git;
pub mod golist;
pub mod pool;
pub mod queries;
pub mod resolver;
pub mod sizer;
pub mod weights;


#[cfg(test)]
pub mod test_utils;

pub use builder::GraphBuilder;
pub use coordinator::{Analysis, Coordinator};
pub use git::{GitRevisions, environment_fingerprint};
pub use golist::GoList;
pub use pool::WorkerPool;
pub use queries::CachedQueries;
pub use resolver::{MetadataResolver, RevisionSource, SizeResolver};
pub use sizer::GoBuildSizer;
pub use weights::assign_weights;
