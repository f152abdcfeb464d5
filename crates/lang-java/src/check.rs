//! Structural consistency check, run on request after resolution.
//!
//! A debugging aid, not a gate: findings go to the diagnostic sink and the
//! run continues.

use crate::error::Result;
use semgraph_core::diagnostics::{Diagnostic, Diagnostics};
use semgraph_core::graph::{BaseKind, Graph, NodeId};

pub fn check_graph(graph: &Graph, diags: &mut Diagnostics) -> Result<()> {
    let mut owner_of: Vec<NodeId> = vec![NodeId::NONE; graph.len()];

    let mut stack = vec![graph.root()];
    while let Some(id) = stack.pop() {
        for child in graph.owned_children_of(id)? {
            if !graph.exists(child) {
                diags.report(Diagnostic::CheckFailure {
                    node: id,
                    message: format!("owned edge to nonexistent node {child}").into(),
                });
                continue;
            }
            let seen = &mut owner_of[child.index()];
            if seen.is_some() {
                diags.report(Diagnostic::CheckFailure {
                    node: child,
                    message: format!("owned by both {seen} and {id}").into(),
                });
                continue;
            }
            *seen = id;
            if graph.parent(child)? != id {
                diags.report(Diagnostic::CheckFailure {
                    node: child,
                    message: format!(
                        "parent edge {} disagrees with owner {id}",
                        graph.parent(child)?
                    )
                    .into(),
                });
            }
            stack.push(child);
        }
        for target in graph.reference_edges_of(id)? {
            if !graph.exists(target) {
                diags.report(Diagnostic::CheckFailure {
                    node: id,
                    message: format!("reference edge to nonexistent node {target}").into(),
                });
            }
        }
    }

    // Everything outside the ownership tree must be a shared node: a
    // flyweight type or a comment.
    for (id, node) in graph.iter() {
        if id == graph.root() || owner_of[id.index()].is_some() {
            continue;
        }
        let kind = node.kind();
        if !kind.is_a(BaseKind::Type) && !kind.is_a(BaseKind::Comment) {
            diags.report(Diagnostic::CheckFailure {
                node: id,
                message: "unreachable from the root through owning edges".into(),
            });
        }
    }
    Ok(())
}
