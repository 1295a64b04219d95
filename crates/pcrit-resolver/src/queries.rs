//! Toolchain queries memoized through the query cache

use pcrit_core::{AnalysisError, PackageMeta, PackageSize, QueryCache, QueryKind, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::resolver::{MetadataResolver, SizeResolver};

/// Metadata and size queries for one run. Every answer goes through the
/// cache, so each identity reaches the toolchain at most once per process
/// (and not at all while the disk tier is still valid).
pub struct CachedQueries {
    cache: QueryCache,
    metadata: Box<dyn MetadataResolver>,
    sizes: Box<dyn SizeResolver>,
}

impl CachedQueries {
    pub fn new(
        cache: QueryCache,
        metadata: Box<dyn MetadataResolver>,
        sizes: Box<dyn SizeResolver>,
    ) -> Self {
        CachedQueries {
            cache,
            metadata,
            sizes,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Direct metadata for `identity`.
    pub fn package(&self, identity: &str) -> Result<PackageMeta> {
        self.memoized(QueryKind::Package, identity, || self.metadata.resolve(identity))
    }

    /// Compiled size for `identity`.
    pub fn size(&self, identity: &str) -> Result<PackageSize> {
        self.memoized(QueryKind::PackageSize, identity, || self.sizes.measure(identity))
    }

    fn memoized<T, F>(&self, kind: QueryKind, identity: &str, query: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        let format_error = |e: serde_json::Error| AnalysisError::CacheFormat {
            kind: kind.to_string(),
            key: identity.to_string(),
            message: e.to_string(),
        };

        let payload = self.cache.get_or_compute(kind, identity, || {
            let answer = query()?;
            serde_json::to_vec(&answer).map_err(format_error)
        })?;
        serde_json::from_slice(&payload).map_err(format_error)
    }
}
