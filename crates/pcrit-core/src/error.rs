//! Error taxonomy shared by every pcrit crate

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Everything that can stop an analysis run.
///
/// All variants except [`AnalysisError::InternalInconsistency`] describe a
/// failure of the environment (toolchain, version control, disk). Internal
/// inconsistencies are defects in pcrit itself and are never worth retrying.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Package metadata could not be located or parsed.
    #[error("resolving {identity}: {message}")]
    Resolution { identity: String, message: String },

    /// The package archive could not be produced.
    #[error("building {identity}: {message}")]
    Build { identity: String, message: String },

    /// The archive was produced but its size or symbols could not be read.
    #[error("measuring {identity}: {message}")]
    Measurement { identity: String, message: String },

    /// Version-control metadata for a fingerprint was unavailable.
    #[error("revision of {}: {message}", path.display())]
    Revision { path: PathBuf, message: String },

    /// Disk tier read/write failed for a reason other than a miss.
    #[error("cache I/O on {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cached payload could not be decoded.
    #[error("cache entry {kind}/{key}: {message}")]
    CacheFormat {
        kind: String,
        key: String,
        message: String,
    },

    /// Configuration file missing or malformed.
    #[error("config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl AnalysisError {
    pub fn internal(message: impl Into<String>) -> Self {
        AnalysisError::InternalInconsistency(message.into())
    }

    pub fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::CacheIo {
            path: path.into(),
            source,
        }
    }

    /// True for defects in pcrit, false for environmental failures.
    pub fn is_internal(&self) -> bool {
        matches!(self, AnalysisError::InternalInconsistency(_))
    }
}
