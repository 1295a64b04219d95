//! pcrit CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "pcrit")]
#[command(about = "Estimate the critical path through a Go package's build", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Query cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dependency graph of a package and report its critical path
    Analyze {
        /// Import path of the package to analyze
        target: String,

        /// Where to write the DOT rendering
        #[arg(long)]
        dot_out: Option<PathBuf>,

        /// Leave base-library packages out of the graph
        #[arg(long)]
        no_std: bool,

        /// Keep the "unsafe" pseudo-package in the graph
        #[arg(long)]
        include_unsafe: bool,

        /// Ask for polyline edges in the DOT output
        #[arg(long)]
        polyline: bool,

        /// Emit the whole graph to the DOT output, not just the critical path
        #[arg(long)]
        full_graph: bool,

        /// Worker limit for parallel queries
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Clear the query cache
    Clear,
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries the report
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "pcrit={log_level},pcrit_core={log_level},pcrit_resolver={log_level}"
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = commands::Settings {
        config: cli.config,
        cache_dir: cli.cache_dir,
    };

    match cli.command {
        Commands::Analyze {
            target,
            dot_out,
            no_std,
            include_unsafe,
            polyline,
            full_graph,
            workers,
        } => {
            let overrides = commands::AnalyzeOverrides {
                dot_out,
                no_std,
                include_unsafe,
                polyline,
                full_graph,
                workers,
            };
            commands::analyze(&settings, &target, overrides)
        }
        Commands::Clear => commands::clear(&settings),
        Commands::Version => {
            println!("pcrit v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
