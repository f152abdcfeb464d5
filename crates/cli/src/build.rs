use semgraph_java::oracle::OracleFeed;
use semgraph_java::{BuildOptions, PartitionMode};
use std::path::PathBuf;
use tracing::info;

#[allow(clippy::too_many_arguments)]
pub fn run(
    feed: PathBuf,
    output: Option<PathBuf>,
    per_declaration: Option<PathBuf>,
    no_comments: bool,
    build_all_external: bool,
    check: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = BuildOptions {
        keep_comments: !no_comments,
        build_all_external,
        check,
        partition: if per_declaration.is_some() {
            PartitionMode::PerDeclaration
        } else {
            PartitionMode::Merged
        },
        output,
        partition_dir: per_declaration,
        ..BuildOptions::default()
    };

    info!("Reading oracle feed: {}", feed.display());
    let feed = OracleFeed::from_json_file(&feed)?;

    let mut result = semgraph_java::build_graph(feed, &options)?;
    info!("Nodes: {}", result.graph.len().saturating_sub(1));
    info!("Units: {}", result.unit_nodes.len());
    info!(
        "External declarations: {}",
        result.closure_range.len()
    );
    if !result.diagnostics.is_empty() {
        info!("Soundness gaps: {}", result.diagnostics.len());
    }

    semgraph_java::save_outputs(&mut result, &options)?;
    Ok(())
}
