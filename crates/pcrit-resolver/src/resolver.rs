//! Collaborator traits for the external toolchain

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

use pcrit_core::{PackageMeta, PackageSize, Result};

/// Answers "what does this package import?".
pub trait MetadataResolver: Send + Sync {
    fn resolve(&self, identity: &str) -> Result<PackageMeta>;
}

/// Answers "how expensive is this package to compile?".
pub trait SizeResolver: Send + Sync {
    fn measure(&self, identity: &str) -> Result<PackageSize>;
}

/// Answers "which revision is checked out at this path?".
pub trait RevisionSource: Send + Sync {
    /// With `soft`, a path that is not under version control yields the
    /// path itself instead of an error.
    fn revision_of(&self, path: &Path, soft: bool) -> Result<String>;
}

impl<T: MetadataResolver + ?Sized> MetadataResolver for Arc<T> {
    fn resolve(&self, identity: &str) -> Result<PackageMeta> {
        (**self).resolve(identity)
    }
}

impl<T: SizeResolver + ?Sized> SizeResolver for Arc<T> {
    fn measure(&self, identity: &str) -> Result<PackageSize> {
        (**self).measure(identity)
    }
}

/// Run `cmd` to completion, returning stdout or a one-line failure message.
pub(crate) fn run_command(cmd: &mut Command) -> std::result::Result<Vec<u8>, String> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let output: Output = cmd
        .output()
        .map_err(|e| format!("failed to spawn {program}: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{program} failed ({}): {}", output.status, stderr.trim()));
    }
    Ok(output.stdout)
}
