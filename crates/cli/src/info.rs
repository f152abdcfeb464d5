use semgraph_core::storage;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

pub fn run(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let (graph, header) = storage::load(&file)?;

    info!("Header:");
    for (key, value) in header.entries() {
        info!("  {key}: {value}");
    }

    let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total = 0usize;
    for (_, node) in graph.iter() {
        total += 1;
        *by_kind.entry(kind_label(node.kind())).or_default() += 1;
    }
    info!("Nodes: {total}");
    for (kind, count) in by_kind {
        info!("  {kind}: {count}");
    }
    info!("Strings: {}", graph.strings().len());
    Ok(())
}

fn kind_label(kind: semgraph_core::graph::NodeKind) -> &'static str {
    use semgraph_core::graph::BaseKind;
    if kind.is_a(BaseKind::Comment) {
        "comments"
    } else if kind.is_a(BaseKind::Type) {
        "types"
    } else if kind.is_a(BaseKind::TypeExpression) {
        "type expressions"
    } else if kind.is_a(BaseKind::Expression) {
        "expressions"
    } else if kind.is_a(BaseKind::Statement) {
        "statements"
    } else if kind.is_a(BaseKind::Declaration) {
        "declarations"
    } else {
        "structure"
    }
}
