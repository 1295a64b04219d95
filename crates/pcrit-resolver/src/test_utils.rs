//! Test utilities: an in-memory toolchain that counts its invocations

use crate::queries::CachedQueries;
use crate::resolver::{MetadataResolver, SizeResolver};
use pcrit_core::{AnalysisError, Fingerprint, PackageMeta, PackageSize, QueryCache, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct FakePackage {
    imports: Vec<String>,
    standard: bool,
    size: u64,
}

/// Answers metadata and size queries from a fixed table.
#[derive(Default)]
pub struct FakeToolchain {
    packages: HashMap<String, FakePackage>,
    broken_builds: HashSet<String>,
    resolve_calls: Mutex<HashMap<String, usize>>,
    measure_calls: Mutex<HashMap<String, usize>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(mut self, identity: &str, imports: &[&str], size: u64) -> Self {
        self.packages.insert(
            identity.to_string(),
            FakePackage {
                imports: imports.iter().map(|s| s.to_string()).collect(),
                standard: false,
                size,
            },
        );
        self
    }

    pub fn standard(mut self, identity: &str, imports: &[&str], size: u64) -> Self {
        self = self.package(identity, imports, size);
        if let Some(pkg) = self.packages.get_mut(identity) {
            pkg.standard = true;
        }
        self
    }

    /// Metadata resolves but measuring fails.
    pub fn broken_build(mut self, identity: &str) -> Self {
        self.broken_builds.insert(identity.to_string());
        self
    }

    /// The P->{Q,R}, Q->{S,T}, R->{T} example with the given cost for S.
    pub fn diamond(s_cost: u64) -> Self {
        FakeToolchain::new()
            .package("P", &["Q", "R"], 10)
            .package("Q", &["S", "T"], 11)
            .package("R", &["T"], 11)
            .package("S", &[], s_cost)
            .package("T", &[], 29)
    }

    pub fn resolve_count(&self, identity: &str) -> usize {
        self.resolve_calls.lock().unwrap().get(identity).copied().unwrap_or(0)
    }

    pub fn measure_count(&self, identity: &str) -> usize {
        self.measure_calls.lock().unwrap().get(identity).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.resolve_calls.lock().unwrap().values().sum::<usize>()
            + self.measure_calls.lock().unwrap().values().sum::<usize>()
    }
}

impl MetadataResolver for FakeToolchain {
    fn resolve(&self, identity: &str) -> Result<PackageMeta> {
        *self
            .resolve_calls
            .lock()
            .unwrap()
            .entry(identity.to_string())
            .or_insert(0) += 1;

        let pkg = self.packages.get(identity).ok_or_else(|| AnalysisError::Resolution {
            identity: identity.to_string(),
            message: format!("cannot find package \"{identity}\""),
        })?;
        Ok(PackageMeta {
            import_path: identity.to_string(),
            standard: pkg.standard,
            root: PathBuf::from(if pkg.standard { "/goroot" } else { "/src" }),
            imports: pkg.imports.clone(),
        })
    }
}

impl SizeResolver for FakeToolchain {
    fn measure(&self, identity: &str) -> Result<PackageSize> {
        *self
            .measure_calls
            .lock()
            .unwrap()
            .entry(identity.to_string())
            .or_insert(0) += 1;

        if self.broken_builds.contains(identity) {
            return Err(AnalysisError::Build {
                identity: identity.to_string(),
                message: "compile error".to_string(),
            });
        }
        let pkg = self.packages.get(identity).ok_or_else(|| AnalysisError::Build {
            identity: identity.to_string(),
            message: "no such package".to_string(),
        })?;
        Ok(PackageSize {
            size: pkg.size,
            num_funcs: pkg.size / 10,
        })
    }
}

/// Cached queries over `toolchain`, with the cache under `dir`.
pub fn queries_for(toolchain: &Arc<FakeToolchain>, dir: &Path) -> CachedQueries {
    queries_with_fingerprint(toolchain, dir, &Fingerprint::new("go-test", "repo-test"))
}

pub fn queries_with_fingerprint(
    toolchain: &Arc<FakeToolchain>,
    dir: &Path,
    fingerprint: &Fingerprint,
) -> CachedQueries {
    let cache = QueryCache::init(dir, fingerprint).unwrap();
    CachedQueries::new(cache, Box::new(Arc::clone(toolchain)), Box::new(Arc::clone(toolchain)))
}
