//! Revision lookups for the cache fingerprint

use std::path::Path;
use std::process::Command;

use pcrit_core::{AnalysisError, Fingerprint, PackageMeta, Result};

use crate::resolver::{run_command, RevisionSource};

/// Reads the head commit with `git log -1 --oneline`.
#[derive(Debug, Clone, Default)]
pub struct GitRevisions;

impl GitRevisions {
    pub fn new() -> Self {
        GitRevisions
    }
}

impl RevisionSource for GitRevisions {
    fn revision_of(&self, path: &Path, soft: bool) -> Result<String> {
        if soft && !path.join(".git").is_dir() {
            tracing::debug!("{} is not a git checkout, using the path", path.display());
            return Ok(path.display().to_string());
        }

        let out = run_command(
            Command::new("git")
                .args(["log", "-1", "--oneline"])
                .current_dir(path),
        )
        .map_err(|message| AnalysisError::Revision {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }
}

/// Fingerprint for analyzing `target`: the toolchain revision (soft lookup)
/// and the target repository revision. A target inside the toolchain root
/// reuses the toolchain revision.
pub fn environment_fingerprint(
    toolchain_root: &Path,
    target: &PackageMeta,
    revisions: &dyn RevisionSource,
) -> Result<Fingerprint> {
    let toolchain = revisions.revision_of(toolchain_root, true)?;
    tracing::debug!("toolchain revision: {}", toolchain);

    let repo = if target.root == toolchain_root {
        tracing::debug!("target is in the toolchain root, reusing its revision");
        toolchain.clone()
    } else {
        revisions.revision_of(&target.root, false)?
    };
    tracing::debug!("target revision: {}", repo);

    Ok(Fingerprint::new(toolchain, repo))
}
