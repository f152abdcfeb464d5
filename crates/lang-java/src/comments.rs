//! Attaches the free comment feed to the nearest owning node.
//!
//! Two ordered indices over every positioned node of a unit (by wide start,
//! by wide end) give each comment its four neighbors: nearest start/end
//! before, nearest start/end after. A scope-boundary test tells same-scope
//! neighbors from nodes across a brace, and the per-style policies pick the
//! owner. Every comment is attached exactly once; comment nodes themselves
//! are flyweights shared by identical occurrences.

use crate::error::Result;
use crate::oracle::SourceComment;
use semgraph_core::graph::{
    BaseKind, CommentStyle, Graph, NodeData, NodeId, Point, Range,
};
use std::collections::BTreeMap;

type Pos = (u32, u32);
type PosIndex = BTreeMap<Pos, Vec<NodeId>>;

pub fn attach_unit(graph: &mut Graph, unit: NodeId, comments: &[SourceComment]) -> Result<()> {
    if comments.is_empty() {
        return Ok(());
    }
    let path_key = match graph.node(unit)?.span {
        Some(span) => span.path,
        None => return Ok(()),
    };
    let package_description = graph
        .strings()
        .resolve(path_key)
        .map(|p| p.ends_with("package-info.java"))
        .unwrap_or(false);

    let (starts, ends) = build_indices(graph, unit)?;

    for comment in comments {
        let start = (comment.start_line, comment.start_col);
        let end = (comment.end_line, comment.end_col);

        let pre = starts.range(..start).next_back();
        let pre_end = ends.range(..end).next_back();
        let post = starts
            .range((std::ops::Bound::Excluded(end), std::ops::Bound::Unbounded))
            .next();
        let post_end = ends
            .range((std::ops::Bound::Excluded(end), std::ops::Bound::Unbounded))
            .next();

        // The node starting right before the comment sits in another scope
        // when the node ending right before it closes earlier than that
        // start; same test on the "after" side.
        let pre_other_scope = match (pre, pre_end) {
            (Some((&pre_start, _)), Some((&pre_end_pos, _))) => pre_end_pos < pre_start,
            _ => false,
        };
        let post_other_scope = match (post, post_end) {
            (Some((&post_start, _)), Some((&post_end_pos, _))) => post_end_pos < post_start,
            _ => false,
        };

        let mut style = comment.style;

        // A doc comment is supposed to immediately precede a member; when it
        // does, it attaches there, otherwise it degrades to a block comment.
        if style == CommentStyle::Doc {
            let target = post.and_then(|(_, nodes)| {
                nodes.iter().copied().find_map(|id| {
                    let node = graph.node(id).ok()?;
                    if package_description {
                        if let NodeData::PackageDeclaration { refers_to, .. } = node.data {
                            return Some(refers_to);
                        }
                    }
                    node.kind().is_a(BaseKind::Member).then_some(id)
                })
            });
            if let Some(target) = target {
                attach(graph, target, comment, path_key, style)?;
                continue;
            }
            style = CommentStyle::Block;
        }

        let target = match style {
            CommentStyle::Line => {
                line_comment_target(graph, comment, pre, pre_end, post, pre_other_scope, post_other_scope)?
            }
            _ => block_comment_target(graph, comment, pre, pre_end, post, pre_other_scope, post_other_scope)?,
        };
        attach(graph, target.unwrap_or(unit), comment, path_key, style)?;
    }
    Ok(())
}

/// A line comment belongs to the highest-ranked node still on its line,
/// else the nearest qualifying successor, else the nearest predecessor
/// wherever it is, else the unit itself.
#[allow(clippy::too_many_arguments)]
fn line_comment_target(
    graph: &Graph,
    comment: &SourceComment,
    pre: Option<(&Pos, &Vec<NodeId>)>,
    pre_end: Option<(&Pos, &Vec<NodeId>)>,
    post: Option<(&Pos, &Vec<NodeId>)>,
    pre_other_scope: bool,
    post_other_scope: bool,
) -> Result<Option<NodeId>> {
    let mut target = None;
    if let Some((_, nodes)) = pre {
        let last = last_by_end(graph, nodes)?;
        let last_line = wide_start_line(graph, last)?;
        if last_line == comment.start_line {
            target = Some(highest_in_line(graph, last, comment.start_line)?);
        } else if post.is_none() || post_other_scope {
            if pre_other_scope {
                target = Some(highest_in_line(graph, last, last_line)?);
            } else if let Some((_, end_nodes)) = pre_end {
                target = Some(first_by_start(graph, end_nodes)?);
            }
        }
    }
    if target.is_none() {
        if let Some((_, nodes)) = post {
            target = Some(last_by_end(graph, nodes)?);
        }
    }
    Ok(target)
}

/// Same policy for block comments, except predecessors match by their end
/// position, which attributes a comment sitting between two sub-expressions
/// on one line to the expression it trails.
#[allow(clippy::too_many_arguments)]
fn block_comment_target(
    graph: &Graph,
    comment: &SourceComment,
    pre: Option<(&Pos, &Vec<NodeId>)>,
    pre_end: Option<(&Pos, &Vec<NodeId>)>,
    post: Option<(&Pos, &Vec<NodeId>)>,
    pre_other_scope: bool,
    post_other_scope: bool,
) -> Result<Option<NodeId>> {
    let mut target = None;
    if !pre_other_scope {
        if let Some((_, nodes)) = pre_end {
            let first = first_by_start(graph, nodes)?;
            if wide_start_line(graph, first)? == comment.start_line
                || post.is_none()
                || post_other_scope
            {
                target = Some(first);
            }
        }
    }
    if target.is_none() && (post.is_none() || post_other_scope) {
        if let Some((_, nodes)) = pre {
            target = Some(last_by_end(graph, nodes)?);
        }
    }
    if target.is_none() {
        if let Some((_, nodes)) = post {
            target = Some(last_by_end(graph, nodes)?);
        }
    }
    Ok(target)
}

fn attach(
    graph: &mut Graph,
    target: NodeId,
    comment: &SourceComment,
    path_key: semgraph_core::storage::strtable::StrKey,
    style: CommentStyle,
) -> Result<()> {
    let range = Range::new(
        path_key,
        Point::new(comment.start_line, comment.start_col),
        Point::new(comment.end_line, comment.end_col),
    );
    let node = graph.comment_node(style, range, &comment.text);
    Ok(graph.attach_comment(target, node)?)
}

/// Indexes every positioned node of the unit: the package declaration, the
/// imports, and the subtree of each type declaration of the unit.
fn build_indices(graph: &Graph, unit: NodeId) -> Result<(PosIndex, PosIndex)> {
    let mut starts = PosIndex::new();
    let mut ends = PosIndex::new();

    let mut roots = Vec::new();
    if let NodeData::CompilationUnit(cu) = &graph.node(unit)?.data {
        if cu.package_declaration.is_some() {
            roots.push(cu.package_declaration);
        }
        roots.extend(cu.imports.iter().copied());
        roots.extend(cu.type_declarations.iter().copied());
    }

    for root in roots {
        for id in graph.subtree(root)? {
            let Some(span) = graph.node(id)?.span else {
                continue;
            };
            starts
                .entry((span.wide_start.line, span.wide_start.col))
                .or_default()
                .push(id);
            ends.entry((span.wide_end.line, span.wide_end.col))
                .or_default()
                .push(id);
        }
    }
    Ok((starts, ends))
}

fn wide_start_line(graph: &Graph, id: NodeId) -> Result<u32> {
    Ok(graph.node(id)?.span.map(|s| s.wide_start.line).unwrap_or(0))
}

/// Of nodes sharing one start position, the one ending last.
fn last_by_end(graph: &Graph, nodes: &[NodeId]) -> Result<NodeId> {
    let mut best = nodes[0];
    let mut best_end = Point::default();
    for &id in nodes {
        let end = graph.node(id)?.span.map(|s| s.wide_end).unwrap_or_default();
        if end >= best_end {
            best = id;
            best_end = end;
        }
    }
    Ok(best)
}

/// Of nodes sharing one end position, the one starting first.
fn first_by_start(graph: &Graph, nodes: &[NodeId]) -> Result<NodeId> {
    let mut best = nodes[0];
    let mut best_start = Point::new(u32::MAX, u32::MAX);
    for &id in nodes {
        let start = graph
            .node(id)?
            .span
            .map(|s| s.wide_start)
            .unwrap_or(Point::new(u32::MAX, u32::MAX));
        if start < best_start {
            best = id;
            best_start = start;
        }
    }
    Ok(best)
}

/// Climbs to the highest ancestor that still starts on `line`.
fn highest_in_line(graph: &Graph, mut id: NodeId, line: u32) -> Result<NodeId> {
    loop {
        let result = id;
        let parent = graph.node(id)?.parent;
        if parent.is_none() {
            return Ok(result);
        }
        let Some(span) = graph.node(parent)?.span else {
            return Ok(result);
        };
        id = parent;
        if span.wide_start.line != line {
            return Ok(result);
        }
    }
}
