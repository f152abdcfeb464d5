//! Stage driver: runs the pipeline in dependency order over one oracle feed
//! and writes the requested partitions.
//!
//! Projection completes before the closure starts; the closure reaches its
//! fixed point before cross edges are resolved; types are materialized last;
//! filtering and persistence only run once all mutation is done. A fatal
//! error in any stage aborts the whole run.

use crate::check::check_graph;
use crate::closure::ClosureBuilder;
use crate::comments;
use crate::config::{BuildOptions, PartitionMode};
use crate::error::{BuildError, Result};
use crate::lloc;
use crate::maps::SymbolMaps;
use crate::oracle::OracleFeed;
use crate::project::Projector;
use crate::resolve::CrossEdgeResolver;
use crate::types::TypeGraphBuilder;
use semgraph_core::diagnostics::Diagnostics;
use semgraph_core::graph::{
    DeclData, DeclNode, Graph, NodeData, NodeId, NodeKind, ReachabilityPass,
};
use semgraph_core::storage::{self, Header};
use std::path::Path;
use std::time::Instant;

pub struct BuildOutput {
    pub graph: Graph,
    pub diagnostics: Diagnostics,
    /// Id segment populated by the external closure.
    pub closure_range: std::ops::Range<u32>,
    pub unit_nodes: Vec<NodeId>,
}

pub fn build_graph(feed: OracleFeed, options: &BuildOptions) -> Result<BuildOutput> {
    let (model, units) = feed.into_parts();
    let mut graph = Graph::new();
    let mut maps = SymbolMaps::default();
    let mut diags = Diagnostics::new();

    let unit_nodes = phase("projection", || {
        let mut projector = Projector::new(&mut graph, &mut maps, &model, &mut diags);
        units
            .iter()
            .map(|unit| projector.project_unit(unit))
            .collect::<Result<Vec<_>>>()
    })?;

    phase("line classification", || {
        for (&node, unit) in unit_nodes.iter().zip(&units) {
            if let Some(source) = &unit.source {
                let lines = lloc::logical_lines(source);
                let end_line = source.lines().count() as u32;
                lloc::assign_lloc(&mut graph, node, &lines, end_line)?;
            }
        }
        Ok(())
    })?;

    let closure_start = graph.next_id().0;
    phase("external closure", || {
        ClosureBuilder::new(&mut graph, &mut maps, &model, options).build()
    })?;
    let closure_range = closure_start..graph.next_id().0;

    if options.keep_comments {
        phase("comment attachment", || {
            for (&node, unit) in unit_nodes.iter().zip(&units) {
                comments::attach_unit(&mut graph, node, &unit.comments)?;
            }
            Ok(())
        })?;
    }

    phase("cross edges", || {
        CrossEdgeResolver::new(&mut graph, &maps, &model, &mut diags).resolve()
    })?;

    phase("type building", || {
        TypeGraphBuilder::new(&mut graph, &mut maps, &model, &mut diags).build()
    })?;

    if options.check {
        phase("graph check", || check_graph(&graph, &mut diags))?;
    }

    diags.log_summary();
    Ok(BuildOutput {
        graph,
        diagnostics: diags,
        closure_range,
        unit_nodes,
    })
}

/// Writes the configured partitions and their filter files.
pub fn save_outputs(output: &mut BuildOutput, options: &BuildOptions) -> Result<()> {
    let header = make_header();
    match options.partition {
        PartitionMode::Merged => {
            let Some(path) = options.output.as_deref() else {
                return Ok(());
            };
            let root = output.graph.root();
            phase("saving merged graph", || {
                save_partition_rooted(
                    &mut output.graph,
                    &[root],
                    output.closure_range.clone(),
                    output.closure_range.clone(),
                    &header,
                    path,
                    true,
                )?;
                Ok(())
            })
        }
        PartitionMode::PerDeclaration => {
            let Some(dir) = options.partition_dir.as_deref() else {
                return Err(BuildError::Oracle(
                    "per-declaration output requires a partition directory".into(),
                ));
            };
            phase("saving per-declaration graphs", || {
                std::fs::create_dir_all(dir)?;
                save_per_declaration(output, &header, dir)
            })
        }
    }
}

fn save_per_declaration(output: &mut BuildOutput, header: &Header, dir: &Path) -> Result<()> {
    let graph = &mut output.graph;
    let arena = 1..graph.len() as u32;

    // Externals the analyzed set actually needs, determined by a merged-view
    // reachability pass; these become the shared "extra" partition instead of
    // being duplicated into every consumer's output.
    graph.filter_mut().clear();
    let root = graph.root();
    let merged = graph.filter_unreachable(
        &[root],
        &ReachabilityPass {
            filter_range: output.closure_range.clone(),
            extern_range: output.closure_range.clone(),
        },
    )?;
    let extra_roots = merged.visited_external;

    let decls: Vec<(NodeId, String)> = graph
        .iter()
        .filter_map(|(id, node)| {
            let NodeData::Decl(DeclNode {
                name,
                data: DeclData::Type(decl),
                ..
            }) = &node.data
            else {
                return None;
            };
            if decl.in_compilation_unit.is_none() {
                return None;
            }
            // Only top-level declarations partition the output.
            let parent_is_package = graph
                .node(node.parent)
                .map(|p| p.kind() == NodeKind::Package)
                .unwrap_or(false);
            if !parent_is_package {
                return None;
            }
            let label = if decl.binary_name.is_empty() {
                name.to_string()
            } else {
                decl.binary_name.to_string()
            };
            Some((id, label))
        })
        .collect();

    for (decl, label) in &decls {
        let path = dir.join(format!("{}.sgi", sanitize(label)));
        save_partition_rooted(
            graph,
            &[*decl],
            arena.clone(),
            output.closure_range.clone(),
            header,
            &path,
            false,
        )?;
    }

    if !extra_roots.is_empty() {
        let path = dir.join("extra.sgi");
        save_partition_rooted(
            graph,
            &extra_roots,
            arena.clone(),
            output.closure_range.clone(),
            header,
            &path,
            false,
        )?;
    }
    graph.filter_mut().clear();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn save_partition_rooted(
    graph: &mut Graph,
    roots: &[NodeId],
    filter_range: std::ops::Range<u32>,
    extern_range: std::ops::Range<u32>,
    header: &Header,
    path: &Path,
    keep_mask: bool,
) -> Result<()> {
    graph.filter_mut().clear();
    let result = graph.filter_unreachable(
        roots,
        &ReachabilityPass {
            filter_range,
            extern_range,
        },
    )?;
    tracing::info!(path = %path.display(), filtered = result.filtered, "writing partition");

    graph.turn_filter_on();
    storage::save(graph, header, path)?;
    graph.filter().save(&path.with_extension("fsgi"))?;
    graph.turn_filter_off();
    if !keep_mask {
        graph.filter_mut().clear();
    }
    Ok(())
}

fn make_header() -> Header {
    let mut header = Header::new();
    header.add("platform", std::env::consts::OS);
    if let Ok(elapsed) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        header.add("timestamp", &elapsed.as_secs().to_string());
    }
    header
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

fn phase<T>(name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    let result = f()?;
    tracing::info!(
        phase = name,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "phase finished"
    );
    Ok(result)
}
