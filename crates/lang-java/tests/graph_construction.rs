//! Projection, closure and cross-edge resolution behavior.

mod common;

use common::*;
use semgraph_core::graph::{
    DeclData, DeclNode, ExprData, ExprNode, NodeData, NodeId, NodeKind, StmtNode,
};
use semgraph_java::oracle::ast::*;
use semgraph_java::oracle::SymbolKind;
use semgraph_java::{build_graph, BuildOptions};

#[test]
fn test_projection_creates_one_node_per_construct() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("com.example");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let (m_sym, _) = fb.method_symbol("run", c_sym, void);

    let decl = class_decl(
        "C",
        c_sym,
        None,
        vec![],
        vec![AstMember::Method(method_decl(
            "run",
            m_sym,
            None,
            Some(block(vec![], at(2, 15, 3, 4))),
            at(2, 3, 3, 4),
        ))],
        at(1, 1, 4, 2),
    );
    let feed = {
        let mut feed = fb.feed;
        feed.units
            .push(unit("src/com/example/C.java", pkg, vec![AstItem::Type(decl)]));
        feed
    };

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let class = find_decl(graph, "C").expect("class projected");
    assert_eq!(graph.kind(class).unwrap(), NodeKind::Class);
    let method = find_member(graph, "C", "run").expect("method projected");
    assert_eq!(graph.kind(method).unwrap(), NodeKind::Method);

    // The class hangs off its package, the package off the root.
    let package = graph.parent(class).unwrap();
    assert_eq!(graph.kind(package).unwrap(), NodeKind::Package);
    assert_eq!(graph.parent(package).unwrap(), graph.root());

    // The unit records the declaration without owning it.
    let unit_node = output.unit_nodes[0];
    match &graph.node(unit_node).unwrap().data {
        NodeData::CompilationUnit(cu) => assert_eq!(cu.type_declarations, vec![class]),
        other => panic!("unexpected unit payload: {other:?}"),
    }

    // Positions carry both narrow and wide spans.
    let span = graph.node(class).unwrap().span.expect("class span");
    assert_eq!(span.start.line, 1);
    assert_eq!(span.wide_end.line, 4);
}

#[test]
fn test_package_hierarchy_is_deduplicated_across_units() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("com.example");
    let (a_sym, _) = fb.type_symbol("A", SymbolKind::Class, pkg);
    let (b_sym, _) = fb.type_symbol("B", SymbolKind::Class, pkg);

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/A.java",
        pkg,
        vec![AstItem::Type(class_decl("A", a_sym, None, vec![], vec![], at(1, 1, 1, 20)))],
    ));
    feed.units.push(unit(
        "src/B.java",
        pkg,
        vec![AstItem::Type(class_decl("B", b_sym, None, vec![], vec![], at(1, 1, 1, 20)))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let packages: Vec<_> = output
        .graph
        .iter()
        .filter(|(_, node)| {
            matches!(&node.data, NodeData::Package(p) if p.qualified_name == "com.example")
        })
        .collect();
    assert_eq!(packages.len(), 1, "one package node for both units");
}

#[test]
fn test_flyweight_types_are_shared_across_usage_sites() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (a_sym, _) = fb.type_symbol("A", SymbolKind::Class, pkg);
    let (b_sym, _) = fb.type_symbol("B", SymbolKind::Class, pkg);
    let int_a = fb.int_type();
    // A second, structurally identical type value from an unrelated site.
    let int_b = fb.int_type();
    let arr_a = fb.array_type(int_a, 1);
    let arr_b = fb.array_type(int_b, 1);
    let fa = fb.field_symbol("xs", a_sym, arr_a);
    let fb_sym = fb.field_symbol("ys", b_sym, arr_b);

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/A.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "A",
            a_sym,
            None,
            vec![],
            vec![AstMember::Field(field_decl(
                "xs",
                fa,
                Some(AstTypeExpr::Array {
                    component: Box::new(AstTypeExpr::Primitive {
                        kind: semgraph_core::graph::PrimitiveKind::Int,
                        ty: int_a,
                        pos: at(2, 3, 2, 6),
                    }),
                    ty: arr_a,
                    pos: at(2, 3, 2, 8),
                }),
                None,
                at(2, 3, 2, 12),
            ))],
            at(1, 1, 3, 2),
        ))],
    ));
    feed.units.push(unit(
        "src/B.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "B",
            b_sym,
            None,
            vec![],
            vec![AstMember::Field(field_decl(
                "ys",
                fb_sym,
                Some(AstTypeExpr::Array {
                    component: Box::new(AstTypeExpr::Primitive {
                        kind: semgraph_core::graph::PrimitiveKind::Int,
                        ty: int_b,
                        pos: at(2, 3, 2, 6),
                    }),
                    ty: arr_b,
                    pos: at(2, 3, 2, 8),
                }),
                None,
                at(2, 3, 2, 12),
            ))],
            at(1, 1, 3, 2),
        ))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let type_of = |field: &str, owner: &str| -> NodeId {
        let decl = find_member(graph, owner, field).unwrap();
        let var_type = match &graph.node(decl).unwrap().data {
            NodeData::Decl(DeclNode {
                data: DeclData::Variable(v),
                ..
            }) => v.var_type,
            other => panic!("not a variable: {other:?}"),
        };
        match &graph.node(var_type).unwrap().data {
            NodeData::Expr(ExprNode { ty, .. }) => *ty,
            other => panic!("not a type expression: {other:?}"),
        }
    };

    let ty_a = type_of("xs", "A");
    let ty_b = type_of("ys", "B");
    assert!(ty_a.is_some());
    assert_eq!(ty_a, ty_b, "identical array types share one node");
    assert_eq!(graph.kind(ty_a).unwrap(), NodeKind::ArrayType);
}

#[test]
fn test_external_closure_reaches_fixed_point_over_supertype_chain() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let ext_pkg = fb.package("ext");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let (b_sym, b_ty) = fb.type_symbol("B", SymbolKind::Class, ext_pkg);
    let (a_sym, a_ty) = fb.type_symbol("A", SymbolKind::Class, ext_pkg);
    let void = fb.void_type();
    fb.method_symbol("fromA", a_sym, void);
    fb.method_symbol("fromB", b_sym, void);
    fb.symbol_mut(b_sym).superclass = a_ty;
    fb.symbol_mut(c_sym).superclass = b_ty;

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            Some(simple_type("B", b_sym, b_ty, at(1, 17, 1, 18))),
            vec![],
            vec![],
            at(1, 1, 2, 2),
        ))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    // Both ancestors materialized exactly once, with full member lists
    // (override soundness pulls parents into the full build).
    assert_eq!(find_decls(graph, "B").len(), 1);
    assert_eq!(find_decls(graph, "A").len(), 1);
    assert!(find_member(graph, "B", "fromB").is_some());
    assert!(find_member(graph, "A", "fromA").is_some());

    // Externals live inside the closure id segment.
    let b_node = find_decl(graph, "B").unwrap();
    assert!(output.closure_range.contains(&b_node.0));

    // The external owner package was built on demand and memoized.
    let ext_packages: Vec<_> = graph
        .iter()
        .filter(|(_, n)| matches!(&n.data, NodeData::Package(p) if p.qualified_name == "ext"))
        .collect();
    assert_eq!(ext_packages.len(), 1);
}

#[test]
fn test_override_edge_prefers_class_ancestry_over_interfaces() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let (b_sym, b_ty) = fb.type_symbol("B", SymbolKind::Class, pkg);
    let (i_sym, i_ty) = fb.type_symbol("I", SymbolKind::Interface, pkg);
    let void = fb.void_type();
    let (m_c, _) = fb.method_symbol("m", c_sym, void);
    fb.method_symbol("m", b_sym, void);
    fb.method_symbol("m", i_sym, void);
    fb.symbol_mut(c_sym).superclass = b_ty;
    fb.symbol_mut(c_sym).interfaces = vec![i_ty];

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            Some(simple_type("B", b_sym, b_ty, at(1, 17, 1, 18))),
            vec![simple_type("I", i_sym, i_ty, at(1, 30, 1, 31))],
            vec![AstMember::Method(method_decl(
                "m",
                m_c,
                None,
                Some(block(vec![], at(2, 12, 2, 14))),
                at(2, 3, 2, 14),
            ))],
            at(1, 1, 3, 2),
        ))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let c_m = find_member(graph, "C", "m").unwrap();
    let b_m = find_member(graph, "B", "m").unwrap();
    let overrides = match &graph.node(c_m).unwrap().data {
        NodeData::Decl(DeclNode {
            data: DeclData::Method(m),
            ..
        }) => m.overrides,
        other => panic!("not a method: {other:?}"),
    };
    assert_eq!(
        overrides, b_m,
        "class ancestry takes precedence over interface ancestry"
    );
}

#[test]
fn test_invocation_miss_falls_back_to_ancestor_walk() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let (b_sym, b_ty) = fb.type_symbol("B", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let (run_b, _) = fb.method_symbol("run", b_sym, void);
    fb.symbol_mut(c_sym).superclass = b_ty;

    // The call-site view of the inherited method: same name and erasure, a
    // different symbol, owned by the subclass, never a declared member.
    let mut view = symbol("run", SymbolKind::Method);
    view.owner = c_sym;
    view.erased_signature = "run()".into();
    let run_view = fb.add_symbol(view);

    let (caller, _) = fb.method_symbol("caller", c_sym, void);

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            Some(simple_type("B", b_sym, b_ty, at(1, 17, 1, 18))),
            vec![],
            vec![AstMember::Method(method_decl(
                "caller",
                caller,
                None,
                Some(block(
                    vec![expr_stmt(
                        call(
                            ident("run", run_view, semgraph_java::oracle::TypeId::NONE, at(2, 5, 2, 8)),
                            run_view,
                            void,
                            at(2, 5, 2, 10),
                        ),
                        at(2, 5, 2, 11),
                    )],
                    at(1, 30, 3, 4),
                )),
                at(1, 25, 3, 4),
            ))],
            at(1, 1, 4, 2),
        ))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let b_run = find_member(graph, "B", "run").expect("inherited method materialized");
    let invocation = graph
        .iter()
        .find_map(|(id, node)| match &node.data {
            NodeData::Expr(ExprNode {
                data: ExprData::MethodInvocation { invokes, .. },
                ..
            }) => Some((id, *invokes)),
            _ => None,
        })
        .expect("invocation projected");
    assert_eq!(invocation.1, b_run, "first match in the superclass chain wins");

    // The declared symbol resolves too, so no gap is recorded for it.
    let _ = run_b;
}

#[test]
fn test_unlabeled_break_resolves_to_innermost_loop() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let bool_ty = fb.bool_type();
    let (m_sym, _) = fb.method_symbol("m", c_sym, void);

    let inner = while_loop(
        bool_literal(true, bool_ty, at(3, 12, 3, 16)),
        block(
            vec![AstStmt::Break {
                label: None,
                label_span: None,
                pos: at(4, 7, 4, 13),
            }],
            at(3, 18, 5, 6),
        ),
        at(3, 5, 5, 6),
    );
    let outer = while_loop(
        bool_literal(true, bool_ty, at(2, 10, 2, 14)),
        block(vec![inner], at(2, 16, 6, 4)),
        at(2, 3, 6, 4),
    );

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            None,
            vec![],
            vec![AstMember::Method(method_decl(
                "m",
                m_sym,
                None,
                Some(block(vec![outer], at(1, 20, 7, 2))),
                at(1, 10, 7, 2),
            ))],
            at(1, 1, 8, 2),
        ))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let (jump, target) = graph
        .iter()
        .find_map(|(id, node)| match &node.data {
            NodeData::Stmt(StmtNode::Break { target, .. }) => Some((id, *target)),
            _ => None,
        })
        .expect("break projected");
    assert!(target.is_some());
    assert_eq!(graph.kind(target).unwrap(), NodeKind::While);

    // Innermost: the break's own enclosing loop, which itself sits inside
    // the other loop.
    let outer_candidate = graph.parent(graph.parent(target).unwrap()).unwrap();
    assert_eq!(graph.kind(outer_candidate).unwrap(), NodeKind::While);
    assert_ne!(target, outer_candidate);
    assert!(graph.subtree(target).unwrap().contains(&jump));
}

#[test]
fn test_labeled_break_resolves_to_exact_label() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let bool_ty = fb.bool_type();
    let (m_sym, _) = fb.method_symbol("m", c_sym, void);

    let inner = while_loop(
        bool_literal(true, bool_ty, at(3, 12, 3, 16)),
        block(
            vec![AstStmt::Break {
                label: Some("outer".into()),
                label_span: Some(sp(4, 13, 4, 18)),
                pos: at(4, 7, 4, 19),
            }],
            at(3, 18, 5, 6),
        ),
        at(3, 5, 5, 6),
    );
    let labeled = AstStmt::Labeled {
        label: "outer".into(),
        statement: Box::new(while_loop(
            bool_literal(true, bool_ty, at(2, 17, 2, 21)),
            block(vec![inner], at(2, 23, 6, 4)),
            at(2, 10, 6, 4),
        )),
        pos: at(2, 3, 6, 4),
    };

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            None,
            vec![],
            vec![AstMember::Method(method_decl(
                "m",
                m_sym,
                None,
                Some(block(vec![labeled], at(1, 20, 7, 2))),
                at(1, 10, 7, 2),
            ))],
            at(1, 1, 8, 2),
        ))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let target = graph
        .iter()
        .find_map(|(_, node)| match &node.data {
            NodeData::Stmt(StmtNode::Break { target, .. }) => Some(*target),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        graph.kind(target).unwrap(),
        NodeKind::LabeledStatement,
        "labeled break skips the innermost loop for the exact label"
    );
}

#[test]
fn test_jump_without_target_is_a_gap_not_an_error() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let (m_sym, _) = fb.method_symbol("m", c_sym, void);

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            None,
            vec![],
            vec![AstMember::Method(method_decl(
                "m",
                m_sym,
                None,
                Some(block(
                    vec![AstStmt::Break {
                        label: None,
                        label_span: None,
                        pos: at(2, 5, 2, 11),
                    }],
                    at(1, 20, 3, 2),
                )),
                at(1, 10, 3, 2),
            ))],
            at(1, 1, 4, 2),
        ))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    assert!(output
        .diagnostics
        .items()
        .iter()
        .any(|d| matches!(d, semgraph_core::Diagnostic::UnresolvedJump { .. })));
}

#[test]
fn test_duplicate_binary_names_are_kept_and_reported() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (a_sym, _) = fb.type_symbol("Dup", SymbolKind::Class, pkg);
    let (b_sym, _) = fb.type_symbol("Dup", SymbolKind::Class, pkg);

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/one/Dup.java",
        pkg,
        vec![AstItem::Type(class_decl("Dup", a_sym, None, vec![], vec![], at(1, 1, 1, 20)))],
    ));
    feed.units.push(unit(
        "src/two/Dup.java",
        pkg,
        vec![AstItem::Type(class_decl("Dup", b_sym, None, vec![], vec![], at(1, 1, 1, 20)))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    assert_eq!(find_decls(&output.graph, "Dup").len(), 2, "both sites kept");
    assert!(output
        .diagnostics
        .items()
        .iter()
        .any(|d| matches!(d, semgraph_core::Diagnostic::DuplicateBinaryName { .. })));
}

#[test]
fn test_for_header_separator_positions_are_recorded() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let bool_ty = fb.bool_type();
    let (m_sym, _) = fb.method_symbol("m", c_sym, void);

    let basic_for = AstStmt::BasicFor {
        init: vec![],
        condition: Some(Box::new(bool_literal(true, bool_ty, at(2, 10, 2, 14)))),
        update: vec![],
        body: Box::new(block(vec![], at(2, 21, 2, 23))),
        semi_spans: Some((sp(2, 8, 2, 9), sp(2, 15, 2, 16))),
        pos: at(2, 3, 2, 23),
    };

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            None,
            vec![],
            vec![AstMember::Method(method_decl(
                "m",
                m_sym,
                None,
                Some(block(vec![basic_for], at(1, 20, 3, 2))),
                at(1, 10, 3, 2),
            ))],
            at(1, 1, 4, 2),
        ))],
    ));

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let (first, second) = output
        .graph
        .iter()
        .find_map(|(_, node)| match &node.data {
            NodeData::Stmt(StmtNode::BasicFor {
                first_semi,
                second_semi,
                ..
            }) => Some((*first_semi, *second_semi)),
            _ => None,
        })
        .expect("for statement projected");
    assert_eq!(first.unwrap().start.col, 8);
    assert_eq!(second.unwrap().start.col, 15);
}

#[test]
fn test_checker_accepts_a_well_formed_graph() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let (m_sym, _) = fb.method_symbol("m", c_sym, void);

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            None,
            vec![],
            vec![AstMember::Method(method_decl(
                "m",
                m_sym,
                None,
                Some(block(vec![], at(1, 20, 3, 2))),
                at(1, 10, 3, 2),
            ))],
            at(1, 1, 4, 2),
        ))],
    ));

    let options = BuildOptions {
        check: true,
        ..BuildOptions::default()
    };
    let output = build_graph(feed, &options).unwrap();
    assert!(
        !output
            .diagnostics
            .items()
            .iter()
            .any(|d| matches!(d, semgraph_core::Diagnostic::CheckFailure { .. })),
        "a freshly built graph passes the structural check"
    );
}

#[test]
fn test_logical_lines_attach_to_declarations() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let (m_sym, _) = fb.method_symbol("m", c_sym, void);

    let source = "class C {\n  // comment only\n  void m() {\n    int x = 1;\n  }\n}\n";
    let mut u = unit(
        "src/C.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "C",
            c_sym,
            None,
            vec![],
            vec![AstMember::Method(method_decl(
                "m",
                m_sym,
                None,
                Some(block(vec![], at(3, 14, 5, 4))),
                at(3, 3, 5, 4),
            ))],
            at(1, 1, 6, 2),
        ))],
    );
    u.source = Some(source.to_string());
    let mut feed = fb.feed;
    feed.units.push(u);

    let output = build_graph(feed, &BuildOptions::default()).unwrap();
    let graph = &output.graph;

    let method = find_member(graph, "C", "m").unwrap();
    let lloc = match &graph.node(method).unwrap().data {
        NodeData::Decl(DeclNode {
            data: DeclData::Method(m),
            ..
        }) => m.lloc,
        _ => unreachable!(),
    };
    // Lines 3, 4 and 5 carry code; the comment line does not.
    assert_eq!(lloc, 3);

    let class = find_decl(graph, "C").unwrap();
    let class_lloc = match &graph.node(class).unwrap().data {
        NodeData::Decl(DeclNode {
            data: DeclData::Type(t),
            ..
        }) => t.lloc,
        _ => unreachable!(),
    };
    assert_eq!(class_lloc, 5, "every line except the comment-only one");
}
