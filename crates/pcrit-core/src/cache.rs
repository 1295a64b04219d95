//! Two-tier (memory + disk) cache for expensive toolchain queries
//!
//! Entries are keyed by `(QueryKind, identity)`. The whole on-disk cache is
//! discarded when the environment fingerprint recorded at initialization no
//! longer matches; there is no per-entry invalidation.

use crate::error::{AnalysisError, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Default cache directory.
pub const DEFAULT_CACHE_DIR: &str = "/tmp/.glcache";

/// Fingerprint record file inside the cache directory.
pub const FINGERPRINT_FILE: &str = "fingerprint.json";

/// Which query an entry answers. Each kind gets its own subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Package,
    PackageSize,
    CriticalPath,
}

impl QueryKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            QueryKind::Package => "golist",
            QueryKind::PackageSize => "pkgsize",
            QueryKind::CriticalPath => "cpath",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Summary of the toolchain and target source revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub toolchain: String,
    pub target: String,
}

impl Fingerprint {
    pub fn new(toolchain: impl Into<String>, target: impl Into<String>) -> Self {
        Fingerprint {
            toolchain: toolchain.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.toolchain, self.target)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FingerprintRecord {
    #[serde(flatten)]
    fingerprint: Fingerprint,
    version: String,
    created_at: String,
}

type EntryKey = (QueryKind, String);

/// Replace path separators so a key maps to exactly one file name.
pub fn sanitize_key(key: &str) -> String {
    key.replace(['/', '\\'], "%")
}

/// Delete the cache directory.
pub fn clear_cache(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| AnalysisError::cache_io(dir, e))?;
    }
    Ok(())
}

/// Memoizing store shared by every component of a run.
pub struct QueryCache {
    dir: PathBuf,
    memory: DashMap<EntryKey, Vec<u8>>,
    /// One lock per key currently being computed.
    in_flight: DashMap<EntryKey, Arc<Mutex<()>>>,
    validated: Mutex<Option<Fingerprint>>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("dir", &self.dir)
            .field("memory_entries", &self.memory.len())
            .finish()
    }
}

impl QueryCache {
    /// Handle on `dir` without touching the disk.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        QueryCache {
            dir: dir.into(),
            memory: DashMap::new(),
            in_flight: DashMap::new(),
            validated: Mutex::new(None),
        }
    }

    /// Open `dir` and validate it against `fingerprint`.
    pub fn init(dir: impl Into<PathBuf>, fingerprint: &Fingerprint) -> Result<Self> {
        let cache = Self::open(dir);
        cache.ensure_valid(fingerprint)?;
        Ok(cache)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Make the disk tier consistent with `fingerprint`. Only the first call
    /// on a handle does any work.
    pub fn ensure_valid(&self, fingerprint: &Fingerprint) -> Result<()> {
        let mut validated = self
            .validated
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = validated.as_ref() {
            if existing != fingerprint {
                tracing::warn!(
                    "cache already validated for {}, ignoring {}",
                    existing,
                    fingerprint
                );
            }
            return Ok(());
        }

        match self.read_record()? {
            Some(recorded) if recorded == *fingerprint => {
                tracing::debug!("cache {} valid for {}", self.dir.display(), fingerprint);
            }
            Some(recorded) => {
                tracing::warn!(
                    "fingerprint changed ({} -> {}), discarding {}",
                    recorded,
                    fingerprint,
                    self.dir.display()
                );
                self.reset(fingerprint)?;
            }
            None => {
                if self.dir.exists() {
                    tracing::warn!(
                        "no usable fingerprint record in {}, discarding it",
                        self.dir.display()
                    );
                }
                self.reset(fingerprint)?;
            }
        }

        *validated = Some(fingerprint.clone());
        Ok(())
    }

    fn record_path(&self) -> PathBuf {
        self.dir.join(FINGERPRINT_FILE)
    }

    /// `None` when the record is absent or unreadable.
    fn read_record(&self) -> Result<Option<Fingerprint>> {
        let path = self.record_path();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AnalysisError::cache_io(path, e)),
        };
        match serde_json::from_slice::<FingerprintRecord>(&bytes) {
            Ok(record) => Ok(Some(record.fingerprint)),
            Err(e) => {
                tracing::debug!("unreadable fingerprint record {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn reset(&self, fingerprint: &Fingerprint) -> Result<()> {
        clear_cache(&self.dir)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| AnalysisError::cache_io(&self.dir, e))?;
        self.memory.clear();

        let record = FingerprintRecord {
            fingerprint: fingerprint.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let path = self.record_path();
        let json = serde_json::to_vec_pretty(&record).map_err(|e| AnalysisError::CacheFormat {
            kind: "fingerprint".to_string(),
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| AnalysisError::cache_io(&path, e))?;
        tracing::debug!("fingerprint record written: {}", path.display());
        Ok(())
    }

    /// On-disk location of an entry.
    pub fn entry_path(&self, kind: QueryKind, key: &str) -> PathBuf {
        self.dir.join(kind.dir_name()).join(sanitize_key(key))
    }

    /// Memory tier first, then disk; a disk hit is copied into memory.
    pub fn get(&self, kind: QueryKind, key: &str) -> Result<Option<Vec<u8>>> {
        let entry = (kind, key.to_string());
        if let Some(hit) = self.memory.get(&entry) {
            return Ok(Some(hit.value().clone()));
        }

        let path = self.entry_path(kind, key);
        match std::fs::read(&path) {
            Ok(payload) => {
                tracing::trace!("disk hit {}/{}", kind, key);
                self.memory.insert(entry, payload.clone());
                Ok(Some(payload))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AnalysisError::cache_io(path, e)),
        }
    }

    /// Write through to both tiers.
    pub fn put(&self, kind: QueryKind, key: &str, payload: &[u8]) -> Result<()> {
        let path = self.entry_path(kind, key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AnalysisError::cache_io(parent, e))?;
        }
        std::fs::write(&path, payload).map_err(|e| AnalysisError::cache_io(&path, e))?;
        self.memory.insert((kind, key.to_string()), payload.to_vec());
        Ok(())
    }

    /// Return the cached payload, or run `compute` and store its result.
    /// Concurrent callers for the same entry wait for a single computation.
    pub fn get_or_compute<F>(&self, kind: QueryKind, key: &str, compute: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        if let Some(hit) = self.get(kind, key)? {
            return Ok(hit);
        }

        let lock = self
            .in_flight
            .entry((kind, key.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished while we waited.
        if let Some(hit) = self.get(kind, key)? {
            return Ok(hit);
        }
        let payload = compute()?;
        self.put(kind, key, &payload)?;
        // Later callers hit the memory tier, so the lock is no longer needed
        self.in_flight.remove(&(kind, key.to_string()));
        Ok(payload)
    }

    /// Number of entries in the memory tier.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }
}
