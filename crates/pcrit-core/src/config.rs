//! Analysis configuration, loadable from a TOML file

use crate::cache::DEFAULT_CACHE_DIR;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Knobs for one analysis run. Every field has a default, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory holding the query cache.
    pub cache_dir: PathBuf,
    /// Worker limit for metadata warm-up.
    pub workers: usize,
    /// Worker limit for size resolution; half of `workers` when unset.
    pub size_workers: Option<usize>,
    /// Keep the "unsafe" pseudo-package in the graph.
    pub include_unsafe: bool,
    /// Drop base-library dependencies (they only import each other).
    pub skip_standard: bool,
    /// Dependency identities that never name a buildable package.
    pub pseudo_dependencies: Vec<String>,
    /// Add `splines=polyline` to the DOT output.
    pub polyline: bool,
    /// Emit every node to the DOT output, not just the critical path.
    pub full_graph: bool,
    pub dot_out: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            workers: default_workers(),
            size_workers: None,
            include_unsafe: false,
            skip_standard: false,
            pseudo_dependencies: vec!["C".to_string()],
            polyline: false,
            full_graph: false,
            dot_out: PathBuf::from("tmp.dot"),
        }
    }
}

/// Number of available execution units, at least 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl AnalysisConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|message| AnalysisError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, String> {
        let config: AnalysisConfig = toml::from_str(text).map_err(|e| e.to_string())?;
        if config.workers == 0 {
            return Err("workers must be at least 1".to_string());
        }
        if config.size_workers == Some(0) {
            return Err("size_workers must be at least 1".to_string());
        }
        Ok(config)
    }

    /// Whether `dep` should be left out of the graph entirely.
    pub fn is_pseudo(&self, dep: &str) -> bool {
        (!self.include_unsafe && dep == "unsafe")
            || self.pseudo_dependencies.iter().any(|p| p == dep)
    }

    pub fn size_workers(&self) -> usize {
        self.size_workers.unwrap_or((self.workers / 2).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/.glcache"));
        assert!(config.workers >= 1);
        assert!(config.size_workers() >= 1);
        assert!(config.is_pseudo("C"));
        assert!(config.is_pseudo("unsafe"));
        assert!(!config.is_pseudo("fmt"));
    }

    #[test]
    fn test_include_unsafe() {
        let config = AnalysisConfig {
            include_unsafe: true,
            ..Default::default()
        };
        assert!(!config.is_pseudo("unsafe"));
        assert!(config.is_pseudo("C"));
    }

    #[test]
    fn test_partial_toml() {
        let config = AnalysisConfig::from_toml(
            r#"
workers = 8
skip_standard = true
pseudo_dependencies = ["C", "embed"]
"#,
        )
        .unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.size_workers(), 4);
        assert!(config.skip_standard);
        assert!(config.is_pseudo("embed"));
        assert_eq!(config.dot_out, PathBuf::from("tmp.dot"));
    }

    #[test]
    fn test_rejects_zero_workers() {
        assert!(AnalysisConfig::from_toml("workers = 0").is_err());
        assert!(AnalysisConfig::from_toml("size_workers = 0").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/pcrit.toml")).unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
        assert!(!err.is_internal());
    }
}
