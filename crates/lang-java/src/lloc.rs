//! Logical-line classification.
//!
//! A line is logical when it carries at least one code token: comment
//! content, blank lines and lines holding only comment trivia do not count,
//! while string literals do even when they contain comment-looking text.
//! The resulting line set is intersected with a node's wide line range to
//! give its LLOC.

use semgraph_core::graph::{DeclData, DeclNode, ExprData, ExprNode, Graph, NodeData, NodeId};
use semgraph_core::Result;
use std::collections::BTreeSet;

#[derive(Clone, Copy, PartialEq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str,
    Char,
}

/// Returns the 1-based numbers of every logical line in `source`.
pub fn logical_lines(source: &str) -> BTreeSet<u32> {
    let mut lines = BTreeSet::new();
    let mut state = State::Code;
    let mut line: u32 = 1;
    let mut escaped = false;

    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
            if state == State::LineComment {
                state = State::Code;
            }
            escaped = false;
            continue;
        }
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                '"' => {
                    state = State::Str;
                    lines.insert(line);
                }
                '\'' => {
                    state = State::Char;
                    lines.insert(line);
                }
                c if !c.is_whitespace() => {
                    lines.insert(line);
                }
                _ => {}
            },
            State::LineComment => {}
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
            State::Str => {
                lines.insert(line);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    state = State::Code;
                }
            }
            State::Char => {
                lines.insert(line);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '\'' {
                    state = State::Code;
                }
            }
        }
    }
    lines
}

fn count_in_span(lines: &BTreeSet<u32>, start: u32, end: u32) -> u32 {
    if start == 0 || end < start {
        return 0;
    }
    lines.range(start..=end).count() as u32
}

/// Sets the LLOC value on the unit node and on every type, method,
/// initializer and lambda node in its subtree.
pub fn assign_lloc(graph: &mut Graph, unit: NodeId, lines: &BTreeSet<u32>, unit_end_line: u32) -> Result<()> {
    let mut targets = graph.subtree(unit)?;
    // Type declarations hang off the package, not the unit; reach them
    // through the association edges.
    if let NodeData::CompilationUnit(cu) = &graph.node(unit)?.data {
        for decl in cu.type_declarations.clone() {
            targets.extend(graph.subtree(decl)?);
        }
    }

    for id in targets {
        let span = match graph.node(id)?.span {
            Some(span) => (span.wide_start.line, span.wide_end.line),
            None => continue,
        };
        let value = count_in_span(lines, span.0, span.1);
        match &mut graph.node_mut(id)?.data {
            NodeData::Decl(DeclNode {
                data: DeclData::Type(t),
                ..
            }) => t.lloc = value,
            NodeData::Decl(DeclNode {
                data: DeclData::Method(m),
                ..
            }) => m.lloc = value,
            NodeData::InitializerBlock { lloc, .. } => *lloc = value,
            NodeData::Expr(ExprNode {
                data: ExprData::Lambda { lloc, .. },
                ..
            }) => *lloc = value,
            _ => {}
        }
    }

    let unit_lloc = count_in_span(lines, 1, unit_end_line.max(1));
    if let NodeData::CompilationUnit(cu) = &mut graph.node_mut(unit)?.data {
        cu.lloc = unit_lloc;
    }
    Ok(())
}
