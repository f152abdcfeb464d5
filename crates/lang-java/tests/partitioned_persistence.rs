//! Filtering and partitioned output at the pipeline level.

mod common;

use common::*;
use semgraph_core::graph::NodeKind;
use semgraph_core::storage;
use semgraph_java::oracle::ast::*;
use semgraph_java::oracle::SymbolKind;
use semgraph_java::{build_graph, save_outputs, BuildOptions, PartitionMode};

/// Class `C extends B` where external `B` carries one referenced method and
/// one member nothing ever uses.
fn fixture() -> semgraph_java::oracle::OracleFeed {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (c_sym, _) = fb.type_symbol("C", SymbolKind::Class, pkg);
    let (b_sym, b_ty) = fb.type_symbol("B", SymbolKind::Class, pkg);
    let void = fb.void_type();
    let int_ty = fb.int_type();
    let (run_b, _) = fb.method_symbol("run", b_sym, void);
    fb.field_symbol("unused", b_sym, int_ty);
    fb.symbol_mut(c_sym).superclass = b_ty;
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
                            ident("run", run_b, semgraph_java::oracle::TypeId::NONE, at(2, 5, 2, 8)),
                            run_b,
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
    feed
}

#[test]
fn test_merged_output_prunes_unused_externals_and_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("graph.sgi");

    let options = BuildOptions {
        output: Some(out.clone()),
        ..BuildOptions::default()
    };
    let mut result = build_graph(fixture(), &options).unwrap();
    save_outputs(&mut result, &options).unwrap();

    let (loaded, header) = storage::load(&out).unwrap();
    assert!(header.get("platform").is_some());

    // The referenced pieces survive.
    assert!(find_decl(&loaded, "C").is_some());
    assert!(find_decl(&loaded, "B").is_some());
    assert!(find_member(&loaded, "B", "run").is_some());
    // The member nothing uses was pruned by the reachability pass.
    assert!(
        find_member(&loaded, "B", "unused").is_none(),
        "compiled-in-but-unused external member must be filtered"
    );

    // The companion filter file covers every node of the pool.
    let mask = semgraph_core::graph::FilterMask::load(&out.with_extension("fsgi")).unwrap();
    assert_eq!(mask.len(), result.graph.len());
    assert!(mask.count_filtered() > 0);
}

#[test]
fn test_filtering_is_idempotent_across_passes() {
    let options = BuildOptions::default();
    let mut result = build_graph(fixture(), &options).unwrap();

    let unused = find_member(&result.graph, "B", "unused").unwrap();
    result.graph.set_filtered(unused).unwrap();
    let count_once = result.graph.filter().count_filtered();
    result.graph.set_filtered(unused).unwrap();
    assert_eq!(
        result.graph.filter().count_filtered(),
        count_once,
        "filtering twice yields the same visible set"
    );
}

#[test]
fn test_per_declaration_partitions_with_shared_extra() {
    let mut fb = FeedBuilder::new();
    let pkg = fb.package("p");
    let (a_sym, _) = fb.type_symbol("First", SymbolKind::Class, pkg);
    let (b_sym, _) = fb.type_symbol("Second", SymbolKind::Class, pkg);
    let (e_sym, e_ty) = fb.type_symbol("Ext", SymbolKind::Class, pkg);
    fb.symbol_mut(a_sym).superclass = e_ty;

    let mut feed = fb.feed;
    feed.units.push(unit(
        "src/First.java",
        pkg,
        vec![AstItem::Type(class_decl(
            "First",
            a_sym,
            Some(simple_type("Ext", e_sym, e_ty, at(1, 21, 1, 24))),
            vec![],
            vec![],
            at(1, 1, 2, 2),
        ))],
    ));
    feed.units.push(unit(
        "src/Second.java",
        pkg,
        vec![AstItem::Type(class_decl("Second", b_sym, None, vec![], vec![], at(1, 1, 2, 2)))],
    ));

    let dir = tempfile::tempdir().unwrap();
    let options = BuildOptions {
        partition: PartitionMode::PerDeclaration,
        partition_dir: Some(dir.path().to_path_buf()),
        ..BuildOptions::default()
    };
    let mut result = build_graph(feed, &options).unwrap();
    save_outputs(&mut result, &options).unwrap();

    let first = dir.path().join("First.sgi");
    let second = dir.path().join("Second.sgi");
    let extra = dir.path().join("extra.sgi");
    assert!(first.exists());
    assert!(second.exists());
    assert!(extra.exists(), "externals are written once, not per consumer");

    let (first_graph, _) = storage::load(&first).unwrap();
    assert!(find_decl(&first_graph, "First").is_some());
    assert!(
        find_decl(&first_graph, "Second").is_none(),
        "sibling declarations stay out of each other's partition"
    );

    let (extra_graph, _) = storage::load(&extra).unwrap();
    let ext = find_decl(&extra_graph, "Ext").expect("needed external in the extra partition");
    assert_eq!(extra_graph.kind(ext).unwrap(), NodeKind::Class);
}

#[test]
fn test_second_load_matches_first() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("graph.sgi");
    let options = BuildOptions {
        output: Some(out.clone()),
        ..BuildOptions::default()
    };
    let mut result = build_graph(fixture(), &options).unwrap();
    save_outputs(&mut result, &options).unwrap();

    let (loaded, _) = storage::load(&out).unwrap();
    let resaved = dir.path().join("resaved.sgi");
    storage::save(&loaded, &storage::Header::new(), &resaved).unwrap();
    let (reloaded, _) = storage::load(&resaved).unwrap();

    assert_eq!(loaded.len(), reloaded.len());
    for (id, node) in loaded.iter() {
        let other = reloaded.node(id).unwrap();
        assert_eq!(node.kind(), other.kind());
        assert_eq!(
            loaded.owned_children_of(id).unwrap(),
            reloaded.owned_children_of(id).unwrap()
        );
        assert_eq!(
            loaded.reference_edges_of(id).unwrap(),
            reloaded.reference_edges_of(id).unwrap()
        );
    }
}
