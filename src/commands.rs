//! CLI command implementations

use anyhow::{Context, bail};
use pcrit_core::{AnalysisConfig, DotOptions, QueryCache, clear_cache, render_dot};
use pcrit_resolver::{
    CachedQueries, Coordinator, GitRevisions, GoBuildSizer, GoList, MetadataResolver,
    environment_fingerprint,
};
use std::path::PathBuf;

/// Options shared by every subcommand.
pub struct Settings {
    pub config: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

/// Command-line values that win over the config file.
pub struct AnalyzeOverrides {
    pub dot_out: Option<PathBuf>,
    pub no_std: bool,
    pub include_unsafe: bool,
    pub polyline: bool,
    pub full_graph: bool,
    pub workers: Option<usize>,
}

fn load_config(settings: &Settings) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &settings.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = &settings.cache_dir {
        config.cache_dir = dir.clone();
    }
    Ok(config)
}

fn apply_overrides(config: &mut AnalysisConfig, overrides: AnalyzeOverrides) -> anyhow::Result<()> {
    if let Some(path) = overrides.dot_out {
        config.dot_out = path;
    }
    if let Some(workers) = overrides.workers {
        if workers == 0 {
            bail!("--workers must be at least 1");
        }
        config.workers = workers;
    }
    config.skip_standard |= overrides.no_std;
    config.include_unsafe |= overrides.include_unsafe;
    config.polyline |= overrides.polyline;
    config.full_graph |= overrides.full_graph;
    Ok(())
}

pub fn analyze(
    settings: &Settings,
    target: &str,
    overrides: AnalyzeOverrides,
) -> anyhow::Result<()> {
    let mut config = load_config(settings)?;
    apply_overrides(&mut config, overrides)?;
    tracing::debug!("config: {:?}", config);

    let go = GoList::new();
    let goroot = go.goroot().context("locating the Go toolchain")?;
    tracing::info!("toolchain root: {}", goroot.display());

    // The fingerprint needs the target's root before the cache can be trusted
    let target_meta = go
        .resolve(target)
        .with_context(|| format!("resolving target {target}"))?;
    let fingerprint = environment_fingerprint(&goroot, &target_meta, &GitRevisions::new())
        .context("fingerprinting the build environment")?;
    tracing::info!("fingerprint: {}", fingerprint);

    let cache = QueryCache::init(&config.cache_dir, &fingerprint)
        .with_context(|| format!("opening cache {}", config.cache_dir.display()))?;
    let queries = CachedQueries::new(cache, Box::new(go), Box::new(GoBuildSizer::new()));

    let analysis = Coordinator::new(&queries, &config)
        .run(target)
        .with_context(|| format!("analyzing {target}"))?;

    println!("\nCritical path:\n{}", analysis.critical_path.render());
    println!("Total cost: {}", analysis.critical_path.total_cost);

    let options = DotOptions {
        polyline: config.polyline,
        subset: if config.full_graph {
            None
        } else {
            Some(analysis.critical_path.nodes())
        },
    };
    let dot = render_dot(&analysis.graph, &options);
    std::fs::write(&config.dot_out, dot)
        .with_context(|| format!("writing {}", config.dot_out.display()))?;
    tracing::info!("graph written to {}", config.dot_out.display());

    Ok(())
}

pub fn clear(settings: &Settings) -> anyhow::Result<()> {
    let config = load_config(settings)?;
    tracing::info!("Clearing cache: {}", config.cache_dir.display());

    clear_cache(&config.cache_dir)?;

    tracing::info!("Cache cleared");
    Ok(())
}
