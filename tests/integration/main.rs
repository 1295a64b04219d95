//! Integration tests for pcrit
//!
//! These tests drive the resolver crate and the binary together.

use pcrit_core::{
    AnalysisConfig, DotOptions, Fingerprint, PackageMeta, PackageSize, QueryCache, QueryKind,
    Result, render_dot,
};
use pcrit_resolver::{CachedQueries, Coordinator, MetadataResolver, SizeResolver};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Package table standing in for the Go toolchain.
struct Table {
    packages: HashMap<&'static str, (Vec<&'static str>, u64)>,
    calls: AtomicUsize,
}

impl Table {
    fn new(rows: &[(&'static str, &[&'static str], u64)]) -> Self {
        Table {
            packages: rows
                .iter()
                .map(|(name, imports, size)| (*name, (imports.to_vec(), *size)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MetadataResolver for Table {
    fn resolve(&self, identity: &str) -> Result<PackageMeta> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (imports, _) = self.packages.get(identity).ok_or_else(|| {
            pcrit_core::AnalysisError::Resolution {
                identity: identity.to_string(),
                message: "not in table".to_string(),
            }
        })?;
        Ok(PackageMeta {
            import_path: identity.to_string(),
            standard: false,
            root: PathBuf::from("/src"),
            imports: imports.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl SizeResolver for Table {
    fn measure(&self, identity: &str) -> Result<PackageSize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let size = self.packages.get(identity).map(|(_, size)| *size).unwrap_or(0);
        Ok(PackageSize {
            size,
            num_funcs: size / 10,
        })
    }
}

fn chain_table() -> Arc<Table> {
    Arc::new(Table::new(&[
        ("example.com/app", &["example.com/app/db", "example.com/app/http", "C"], 40),
        ("example.com/app/db", &["example.com/app/util"], 120),
        ("example.com/app/http", &["example.com/app/util"], 80),
        ("example.com/app/util", &[], 30),
    ]))
}

fn queries(table: &Arc<Table>, dir: &std::path::Path) -> CachedQueries {
    let cache = QueryCache::init(dir, &Fingerprint::new("go1.22", "deadbeef")).unwrap();
    CachedQueries::new(cache, Box::new(Arc::clone(table)), Box::new(Arc::clone(table)))
}

#[test]
fn test_pipeline_end_to_end() {
    let dir = TempDir::new().unwrap();
    let table = chain_table();
    let queries = queries(&table, dir.path());
    let config = AnalysisConfig {
        workers: 4,
        ..AnalysisConfig::default()
    };

    let analysis = Coordinator::new(&queries, &config).run("example.com/app").unwrap();

    assert_eq!(
        analysis.critical_path.identities(),
        vec!["example.com/app", "example.com/app/db", "example.com/app/util"]
    );
    assert_eq!(analysis.critical_path.total_cost, 190);
    assert_eq!(analysis.graph.node_count(), 4);

    let rendered = analysis.critical_path.render();
    assert!(rendered.starts_with("example.com/app [weight:40 nfuncs:4]\n"));

    let stored = queries
        .cache()
        .get(QueryKind::CriticalPath, "example.com/app")
        .unwrap()
        .unwrap();
    assert_eq!(stored, rendered.into_bytes());
}

#[test]
fn test_pipeline_dot_marks_critical_edges() {
    let dir = TempDir::new().unwrap();
    let table = chain_table();
    let queries = queries(&table, dir.path());
    let config = AnalysisConfig::default();

    let analysis = Coordinator::new(&queries, &config).run("example.com/app").unwrap();

    let full = render_dot(&analysis.graph, &DotOptions::default());
    assert_eq!(full.matches(" -> ").count(), 4);
    assert_eq!(full.matches("color=\"red\"").count(), 2);

    let subset = render_dot(
        &analysis.graph,
        &DotOptions {
            polyline: true,
            subset: Some(analysis.critical_path.nodes()),
        },
    );
    assert!(subset.contains("splines=polyline"));
    assert!(!subset.contains("example.com/app/http"));
    assert_eq!(subset.matches(" -> ").count(), 2);
}

#[test]
fn test_pipeline_reuses_disk_cache() {
    let dir = TempDir::new().unwrap();
    let config = AnalysisConfig::default();

    let first = chain_table();
    Coordinator::new(&queries(&first, dir.path()), &config)
        .run("example.com/app")
        .unwrap();
    assert!(first.calls.load(Ordering::SeqCst) >= 8);

    let second = chain_table();
    Coordinator::new(&queries(&second, dir.path()), &config)
        .run("example.com/app")
        .unwrap();
    assert_eq!(second.calls.load(Ordering::SeqCst), 0);
}

fn pcrit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pcrit"))
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_help() {
    let output = pcrit().arg("--help").output().expect("failed to run pcrit");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("critical path"));
}

#[test]
fn test_cli_version() {
    let output = pcrit().arg("version").output().expect("failed to run pcrit");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("pcrit v"));
}

#[test]
fn test_cli_clear_removes_cache_dir() {
    let root = TempDir::new().unwrap();
    let cache_dir = root.path().join("cache");
    std::fs::create_dir_all(cache_dir.join("golist")).unwrap();
    std::fs::write(cache_dir.join("golist").join("fmt"), b"{}").unwrap();

    let status = pcrit()
        .arg("--cache-dir")
        .arg(&cache_dir)
        .arg("clear")
        .status()
        .expect("failed to run pcrit");

    assert!(status.success());
    assert!(!cache_dir.exists());
}

#[test]
fn test_cli_missing_config_fails() {
    let root = TempDir::new().unwrap();
    let output = pcrit()
        .arg("--config")
        .arg(root.path().join("absent.toml"))
        .arg("clear")
        .output()
        .expect("failed to run pcrit");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.toml"));
}
