//! Comment attachment policies.

mod common;

use common::*;
use semgraph_core::graph::{CommentStyle, NodeData, NodeKind};
use semgraph_java::oracle::ast::*;
use semgraph_java::oracle::{SourceComment, SymbolKind};
use semgraph_java::{build_graph, BuildOptions};

fn comment(style: CommentStyle, start: (u32, u32), end: (u32, u32), text: &str) -> SourceComment {
    SourceComment {
        style,
        start_line: start.0,
        start_col: start.1,
        end_line: end.0,
        end_col: end.1,
        text: text.to_string(),
    }
}

/// One class, one method at lines 3..5, one trailing field at line 6.
fn fixture(comments: Vec<SourceComment>) -> semgraph_java::oracle::OracleFeed {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let int_ty = fb.int_type();
    let (m_sym, _) = fb.method_symbol("m", c_sym, void);
    let f_sym = fb.field_symbol("count", c_sym, int_ty);

    let mut u = unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            None,
            vec![],
            vec![
                AstMember::Method(method_decl(
                    "m",
                    m_sym,
                    None,
                    Some(block(
                        vec![AstStmt::LocalVar(field_decl(
                            "x",
                            semgraph_java::oracle::SymbolId::NONE,
                            None,
                            Some(int_literal(1, int_ty, at(4, 13, 4, 14))),
                            at(4, 5, 4, 15),
                        ))],
                        at(3, 14, 5, 4),
                    )),
                    at(3, 3, 5, 4),
                )),
                AstMember::Field(field_decl(
                    "count",
                    f_sym,
                    None,
                    Some(int_literal(0, int_ty, at(6, 15, 6, 16))),
                    at(6, 3, 6, 17),
                )),
            ],
            at(1, 1, 7, 2),
        ))],
    );
    u.comments = comments;
    let mut feed = fb.feed;
    feed.units.push(u);
    feed
}

fn comments_of(graph: &semgraph_core::Graph, id: semgraph_core::graph::NodeId) -> Vec<NodeKind> {
    graph.node(id).unwrap().comments.iter().map(|&c| graph.kind(c).unwrap()).collect()
}

#[test]
fn test_doc_comment_attaches_to_following_declaration() {
    let feed = fixture(vec![comment(CommentStyle::Doc, (2, 3), (2, 20), "runs it")]);
    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let method = find_member(graph, "C", "m").unwrap();
    assert_eq!(comments_of(graph, method), vec![NodeKind::DocComment]);
}

#[test]
fn test_doc_comment_without_following_member_degrades_to_block() {
    // After the last member: no successor, so the doc style degrades and the
    // comment attaches to the nearest preceding node.
    let feed = fixture(vec![comment(CommentStyle::Doc, (6, 20), (6, 40), "stale doc")]);
    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let attached: Vec<_> = graph
        .iter()
        .flat_map(|(_, node)| node.comments.iter().copied())
        .collect();
    assert_eq!(attached.len(), 1);
    assert_eq!(
        graph.kind(attached[0]).unwrap(),
        NodeKind::BlockComment,
        "degraded doc is stored as a block comment"
    );
}

#[test]
fn test_line_comment_prefers_same_line_predecessor() {
    let feed = fixture(vec![comment(CommentStyle::Line, (4, 20), (4, 35), "why one")]);
    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    // The local variable is the last node on line 4; climbing stops at the
    // statement that still starts on that line.
    let local = find_decl(graph, "x").unwrap();
    assert_eq!(comments_of(graph, local), vec![NodeKind::LineComment]);
}

#[test]
fn test_every_comment_is_attached_exactly_once() {
    let feed = fixture(vec![
        comment(CommentStyle::Doc, (2, 3), (2, 20), "doc"),
        comment(CommentStyle::Line, (4, 20), (4, 30), "trailing"),
        comment(CommentStyle::Block, (6, 20), (6, 30), "note"),
    ]);
    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let attachments: usize = graph.iter().map(|(_, node)| node.comments.len()).sum();
    assert_eq!(attachments, 3);
}

#[test]
fn test_attachment_is_deterministic() {
    let comments = vec![
        comment(CommentStyle::Doc, (2, 3), (2, 20), "doc"),
        comment(CommentStyle::Line, (4, 20), (4, 30), "trailing"),
    ];
    let snapshot = |feed| {
        let output = build_graph(feed, &BuildOptions::default()).unwrap();
        let graph = &output.graph;
        let mut pairs: Vec<(u32, Vec<u32>)> = graph
            .iter()
            .filter(|(_, n)| !n.comments.is_empty())
            .map(|(id, n)| (id.0, n.comments.iter().map(|c| c.0).collect()))
            .collect();
        pairs.sort();
        pairs
    };
    assert_eq!(snapshot(fixture(comments.clone())), snapshot(fixture(comments)));
}

#[test]
fn test_identical_comments_share_one_flyweight_node() {
    // Same style, same text, same span in two different files: one node.
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (a_sym, _) = fb.type_symbol("A", SymbolKind::Class, pkg);
    let (b_sym, _) = fb.type_symbol("B", SymbolKind::Class, pkg);

    let mut unit_a = unit(
        "src/Same.java",
        pkg,
        vec![AstItem::Type(class_decl("A", a_sym, None, vec![], vec![], at(2, 1, 2, 20)))],
    );
    unit_a.comments = vec![comment(CommentStyle::Line, (2, 25), (2, 30), "same")];
    let mut unit_b = unit(
        "src/Same.java",
        pkg,
        vec![AstItem::Type(class_decl("B", b_sym, None, vec![], vec![], at(2, 1, 2, 20)))],
    );
    unit_b.comments = vec![comment(CommentStyle::Line, (2, 25), (2, 30), "same")];

    let mut feed = fb.feed;
    feed.units.push(unit_a);
    feed.units.push(unit_b);

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let comment_nodes: Vec<_> = graph
        .iter()
        .filter(|(_, n)| matches!(n.data, NodeData::Comment { .. }))
        .collect();
    assert_eq!(comment_nodes.len(), 1, "structurally equal comments share a node");

    let owners = graph
        .iter()
        .filter(|(_, n)| !n.comments.is_empty())
        .count();
    assert_eq!(owners, 2, "both classes carry the shared node");
}
