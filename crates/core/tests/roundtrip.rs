//! Save/load round-trip behavior of the binary graph format.

use semgraph_core::graph::{
    CommentStyle, CompilationUnitNode, DeclData, DeclNode, ExprData, ExprNode, Graph, Modifiers,
    Node, NodeData, NodeId, NodeKind, Point, PrimitiveKind, Range, TypeDeclData, TypeShape,
    VarShape, VariableData, Visibility,
};
use semgraph_core::storage::{self, Header};
use semgraph_core::GraphError;

fn sample_graph() -> Graph {
    let mut graph = Graph::new();
    let path = graph.intern("src/A.java");
    let span = Range::new(path, Point::new(3, 1), Point::new(9, 2))
        .with_wide(Point::new(1, 1), Point::new(9, 2));

    let int_ty = graph.primitive_type(PrimitiveKind::Int);
    let field_init = graph
        .insert(Node::new(NodeData::Expr(ExprNode {
            ty: int_ty,
            data: ExprData::Literal {
                value: semgraph_core::graph::LiteralValue::Integer(41),
                text: "41".into(),
            },
        })))
        .unwrap();
    let field = graph
        .insert(Node::new(NodeData::Decl(DeclNode {
            name: "limit".into(),
            name_span: None,
            modifiers: Modifiers {
                visibility: Visibility::Private,
                is_static: false,
                is_final: true,
                is_abstract: false,
            },
            annotations: vec![],
            data: DeclData::Variable(VariableData {
                shape: VarShape::Field,
                var_type: NodeId::NONE,
                init: field_init,
            }),
        })))
        .unwrap();

    let mut class_node = Node::new(NodeData::Decl(DeclNode {
        name: "A".into(),
        name_span: Some(span),
        modifiers: Modifiers {
            visibility: Visibility::Public,
            ..Modifiers::default()
        },
        annotations: vec![],
        data: DeclData::Type(TypeDeclData {
            shape: TypeShape::Class,
            is_generic: false,
            binary_name: "A".into(),
            type_parameters: vec![],
            superclass: NodeId::NONE,
            super_interfaces: vec![],
            members: vec![field],
            others: vec![],
            in_compilation_unit: NodeId::NONE,
            lloc: 7,
        }),
    }));
    class_node.span = Some(span);
    let class = graph.insert(class_node).unwrap();

    let unit = graph
        .insert(Node::new(NodeData::CompilationUnit(CompilationUnitNode {
            package_declaration: NodeId::NONE,
            imports: vec![],
            others: vec![],
            type_declarations: vec![],
            lloc: 9,
        })))
        .unwrap();
    let root = graph.root();
    graph.add_compilation_unit(root, unit).unwrap();
    graph.add_member(root, class).unwrap();
    graph.associate_type_declaration(unit, class).unwrap();

    let comment = graph.comment_node(CommentStyle::Doc, span, "the A class");
    graph.attach_comment(class, comment).unwrap();
    graph
}

#[test]
fn test_roundtrip_is_observationally_identical() {
    let graph = sample_graph();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.sgi");

    let mut header = Header::new();
    header.add("platform", std::env::consts::OS);
    storage::save(&graph, &header, &file).unwrap();

    let (loaded, loaded_header) = storage::load(&file).unwrap();
    assert_eq!(loaded_header.get("platform"), Some(std::env::consts::OS));
    assert_eq!(loaded.len(), graph.len());

    for (id, node) in graph.iter() {
        let other = loaded.node(id).unwrap();
        assert_eq!(node.kind(), other.kind(), "kind of {id}");
        assert_eq!(node.span, other.span, "span of {id}");
        assert_eq!(node.comments, other.comments, "comments of {id}");
        assert_eq!(
            graph.owned_children_of(id).unwrap(),
            loaded.owned_children_of(id).unwrap(),
            "children of {id}"
        );
        assert_eq!(
            graph.reference_edges_of(id).unwrap(),
            loaded.reference_edges_of(id).unwrap(),
            "references of {id}"
        );
        if node.parent.is_some() {
            assert_eq!(node.parent, other.parent, "parent of {id}");
        }
    }

    // Interned strings survive with their keys.
    let key = graph.strings().get("src/A.java").unwrap();
    assert_eq!(loaded.strings().resolve(key), Some("src/A.java"));
}

#[test]
fn test_load_rejects_wrong_version_before_reading_nodes() {
    let graph = sample_graph();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.sgi");
    storage::save(&graph, &Header::new(), &file).unwrap();

    // Corrupt the binary-version value in place. The header stores plain
    // length-prefixed strings, so the version text is findable as bytes.
    let mut bytes = std::fs::read(&file).unwrap();
    let needle = b"BinaryVersion";
    let pos = bytes
        .windows(needle.len())
        .position(|w| w == needle)
        .unwrap();
    // key is followed by the value: u32 length + text
    let value_start = pos + needle.len() + 4;
    bytes[value_start] = b'!';
    std::fs::write(&file, &bytes).unwrap();

    let err = storage::load(&file).unwrap_err();
    assert!(matches!(err, GraphError::Version { which: "binary", .. }));
}

#[test]
fn test_filtered_nodes_are_not_written() {
    let mut graph = sample_graph();
    let class = graph
        .iter()
        .find(|(_, n)| n.kind() == NodeKind::Class)
        .map(|(id, _)| id)
        .unwrap();
    graph.set_filtered(class).unwrap();
    graph.turn_filter_on();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.sgi");
    storage::save(&graph, &Header::new(), &file).unwrap();

    let (loaded, _) = storage::load(&file).unwrap();
    assert!(!loaded.exists(class));
    // The root package dropped the filtered member from its edge list.
    assert!(!loaded
        .owned_children_of(loaded.root())
        .unwrap()
        .contains(&class));
}

#[test]
fn test_filter_mask_file_roundtrip() {
    let mut graph = sample_graph();
    let some_id = NodeId(3);
    graph.set_filtered_this_node_only(some_id).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.fsgi");
    graph.filter().save(&file).unwrap();

    let mask = semgraph_core::graph::FilterMask::load(&file).unwrap();
    assert_eq!(mask.len(), graph.len());
    assert!(mask.is_filtered(some_id));
    assert!(!mask.is_filtered(NodeId(2)));
}
