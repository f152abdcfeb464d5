mod build;
mod info;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "semgraph",
    version,
    about = "Builds a persistent semantic graph from a front-end oracle feed",
    long_about = "Semgraph turns the parsed, symbol- and type-resolved output of a language \
                  front end into a standalone, cross-referenced semantic graph that metric \
                  and rule-checking tools consume instead of re-parsing source."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a semantic graph from an oracle feed
    Build {
        /// Path to the JSON oracle feed
        #[arg(value_name = "FEED")]
        feed: PathBuf,
        /// Path of the merged graph file (the filter file lands next to it)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Write one graph per top-level declaration into this directory
        #[arg(long, value_name = "DIR")]
        per_declaration: Option<PathBuf>,
        /// Drop the comment feed instead of attaching it
        #[arg(long)]
        no_comments: bool,
        /// Materialize the full member list of every external declaration
        #[arg(long)]
        build_all_external: bool,
        /// Run the structural checker after resolution
        #[arg(long)]
        check: bool,
    },
    /// Print summary information about a saved graph file
    Info {
        /// Path to a graph file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Build {
            feed,
            output,
            per_declaration,
            no_comments,
            build_all_external,
            check,
        } => build::run(
            feed,
            output,
            per_declaration,
            no_comments,
            build_all_external,
            check,
        ),
        Commands::Info { file } => info::run(file),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
