//! Package metadata via `go list -json`

use std::path::PathBuf;
use std::process::Command;

use pcrit_core::{AnalysisError, PackageMeta, Result};

use crate::resolver::{run_command, MetadataResolver};

/// Invokes the `go` command found on `PATH` (or an explicit binary).
#[derive(Debug, Clone)]
pub struct GoList {
    go: PathBuf,
}

impl GoList {
    pub fn new() -> Self {
        Self::with_binary("go")
    }

    pub fn with_binary(go: impl Into<PathBuf>) -> Self {
        GoList { go: go.into() }
    }

    /// `go env GOROOT`.
    pub fn goroot(&self) -> Result<PathBuf> {
        let out = run_command(Command::new(&self.go).args(["env", "GOROOT"])).map_err(|message| {
            AnalysisError::Resolution {
                identity: "GOROOT".to_string(),
                message,
            }
        })?;
        Ok(PathBuf::from(String::from_utf8_lossy(&out).trim()))
    }
}

impl Default for GoList {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one `go list -json` object.
pub fn parse_package(identity: &str, json: &[u8]) -> Result<PackageMeta> {
    serde_json::from_slice(json).map_err(|e| AnalysisError::Resolution {
        identity: identity.to_string(),
        message: format!("unmarshal: {e}"),
    })
}

impl MetadataResolver for GoList {
    fn resolve(&self, identity: &str) -> Result<PackageMeta> {
        tracing::debug!("go list -json {}", identity);
        let out = run_command(Command::new(&self.go).args(["list", "-json", identity])).map_err(
            |message| AnalysisError::Resolution {
                identity: identity.to_string(),
                message,
            },
        )?;
        parse_package(identity, &out)
    }
}
