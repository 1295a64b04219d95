//! Package size estimation from compiled export data

use std::path::PathBuf;
use std::process::Command;

use pcrit_core::{AnalysisError, PackageSize, Result};

use crate::resolver::{run_command, SizeResolver};

/// Builds a package with `go list -export` and measures the archive the
/// toolchain leaves in its build cache.
#[derive(Debug, Clone)]
pub struct GoBuildSizer {
    go: PathBuf,
}

impl GoBuildSizer {
    pub fn new() -> Self {
        Self::with_binary("go")
    }

    pub fn with_binary(go: impl Into<PathBuf>) -> Self {
        GoBuildSizer { go: go.into() }
    }

    fn build_error(identity: &str, message: impl Into<String>) -> AnalysisError {
        AnalysisError::Build {
            identity: identity.to_string(),
            message: message.into(),
        }
    }

    fn measure_error(identity: &str, message: impl Into<String>) -> AnalysisError {
        AnalysisError::Measurement {
            identity: identity.to_string(),
            message: message.into(),
        }
    }
}

impl Default for GoBuildSizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Packages implemented inside the compiler. They have no export data.
const BUILTIN_PACKAGES: &[&str] = &["unsafe", "builtin"];

/// Count defined text (function) symbols in `go tool nm` output.
///
/// Lines look like `  4a0f0 T fmt.Println` for defined symbols and
/// `         U runtime.morestack` for references. Lines without an address
/// are not definitions and are not counted.
pub fn count_functions(nm_output: &str) -> u64 {
    nm_output
        .lines()
        .filter(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            matches!(fields.as_slice(), [_, kind, _, ..] if *kind == "T")
        })
        .count() as u64
}

impl SizeResolver for GoBuildSizer {
    fn measure(&self, identity: &str) -> Result<PackageSize> {
        tracing::debug!("measuring {}", identity);
        let out = run_command(Command::new(&self.go).args([
            "list",
            "-export",
            "-f",
            "{{.Export}}",
            identity,
        ]))
        .map_err(|message| Self::build_error(identity, message))?;

        let export = String::from_utf8_lossy(&out).trim().to_string();
        if export.is_empty() {
            if BUILTIN_PACKAGES.contains(&identity) {
                tracing::debug!("{} is built into the compiler, size 0", identity);
                return Ok(PackageSize {
                    size: 0,
                    num_funcs: 0,
                });
            }
            return Err(Self::build_error(identity, "no export data produced"));
        }
        let archive = PathBuf::from(export);

        let size = std::fs::metadata(&archive)
            .map_err(|e| Self::measure_error(identity, format!("{}: {e}", archive.display())))?
            .len();

        let nm = run_command(Command::new(&self.go).arg("tool").arg("nm").arg(&archive))
            .map_err(|message| Self::measure_error(identity, message))?;
        let num_funcs = count_functions(&String::from_utf8_lossy(&nm));

        Ok(PackageSize { size, num_funcs })
    }
}
