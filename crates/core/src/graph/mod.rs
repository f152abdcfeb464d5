//! The graph store: an arena of nodes addressed by dense integer ids.
//!
//! Ids are monotonically assigned and never reused within a run; id 0 is the
//! "absent" sentinel and id 1 is always the synthetic root package. Flyweight
//! kinds (comments, type nodes) go through canonicalizing constructors so
//! that structurally identical values share one node.

mod filter;
mod flyweight;
mod kind;
mod node;
mod range;
mod reach;

pub use filter::FilterMask;
pub use reach::{ReachabilityPass, ReachabilityResult};
pub use kind::{BaseKind, NodeKind};
pub use node::{
    AssignOperator, CommentStyle, CompilationUnitNode, DeclData, DeclNode, ExprData, ExprNode,
    InfixOperator, LiteralValue, MemberRefMode, MethodData, MethodKind, Modifiers, Node, NodeData,
    NodeId, PackageNode, PostfixOperator, PrefixOperator, PrimitiveKind, StmtNode, TypeDeclData,
    TypeNode, TypeShape, VarShape, VariableData, Visibility, WildcardBound,
};
pub use range::{Point, Range};

use crate::error::{GraphError, Result};
use crate::storage::strtable::{StrKey, StrTable};
use flyweight::{flyweight_map, FlyweightKey, FlyweightMap};
use smol_str::SmolStr;

#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    strings: StrTable,
    flyweights: FlyweightMap,
    filter: FilterMask,
    filter_on: bool,
    root: NodeId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        let mut graph = Graph {
            nodes: vec![None],
            strings: StrTable::new(),
            flyweights: flyweight_map(),
            filter: FilterMask::new(),
            filter_on: false,
            root: NodeId::NONE,
        };
        let root = graph.alloc(Node::new(NodeData::Package(PackageNode {
            name: SmolStr::new("<root>"),
            qualified_name: SmolStr::new("<root>"),
            annotations: Vec::new(),
            members: Vec::new(),
            compilation_units: Vec::new(),
        })));
        graph.root = root;
        graph
    }

    /// Rebuilds a store from loaded parts; used by the file loader only.
    pub(crate) fn from_parts(nodes: Vec<Option<Node>>, strings: StrTable) -> Result<Graph> {
        let root = NodeId(1);
        let mut filter = FilterMask::new();
        filter.resize(nodes.len());
        let graph = Graph {
            nodes,
            strings,
            flyweights: flyweight_map(),
            filter,
            filter_on: false,
            root,
        };
        match graph.node(root)?.data {
            NodeData::Package(_) => Ok(graph),
            _ => Err(GraphError::Format("node 1 is not the root package".into())),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Arena length, including the id-0 sentinel slot.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    /// Id the next created node will get.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u32)
    }

    pub fn strings(&self) -> &StrTable {
        &self.strings
    }

    pub fn intern(&mut self, text: &str) -> StrKey {
        self.strings.set(text)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        self.filter.resize(self.nodes.len());
        id
    }

    /// Creates a node and links its owned children back to it. A child that
    /// already has an owner indicates a builder bug and is a hard error.
    pub fn insert(&mut self, node: Node) -> Result<NodeId> {
        let mut children = Vec::new();
        node.data.owned_children(&mut children);
        let id = self.alloc(node);
        for child in children {
            self.set_parent(child, id)?;
        }
        Ok(id)
    }

    fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        let node = self.node_mut(child)?;
        if node.parent.is_some() && node.parent != parent {
            return Err(GraphError::EdgeReassigned {
                node: child,
                edge: "parent",
                old: node.parent,
                new: parent,
            });
        }
        node.parent = parent;
        Ok(())
    }

    pub fn exists(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.index()), Some(Some(_)))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .and_then(|slot| slot.as_ref())
            .ok_or(GraphError::InvalidId(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .and_then(|slot| slot.as_mut())
            .ok_or(GraphError::InvalidId(id))
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind> {
        Ok(self.node(id)?.kind())
    }

    pub fn parent(&self, id: NodeId) -> Result<NodeId> {
        Ok(self.node(id)?.parent)
    }

    /// Single pass over the store in id order, skipping absent slots and,
    /// while the filter is turned on, filtered nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        let filter_on = self.filter_on;
        let filter = &self.filter;
        self.nodes
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| {
                let node = slot.as_ref()?;
                let id = NodeId(index as u32);
                if filter_on && filter.is_filtered(id) {
                    return None;
                }
                Some((id, node))
            })
    }

    pub fn owned_children_of(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.node(id)?.data.owned_children(&mut out);
        Ok(out)
    }

    pub fn reference_edges_of(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.node(id)?.data.reference_edges(&mut out);
        Ok(out)
    }

    /// Preorder walk of the owned subtree under `root`, `root` included.
    pub fn subtree(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = Vec::new();
            self.node(id)?.data.owned_children(&mut children);
            children.reverse();
            stack.extend(children);
        }
        Ok(out)
    }

    // ---- Filter facade ----

    pub fn turn_filter_on(&mut self) {
        self.filter_on = true;
    }

    pub fn turn_filter_off(&mut self) {
        self.filter_on = false;
    }

    pub fn is_filter_on(&self) -> bool {
        self.filter_on
    }

    pub fn is_filtered(&self, id: NodeId) -> bool {
        self.filter_on && self.filter.is_filtered(id)
    }

    pub fn filter(&self) -> &FilterMask {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterMask {
        &mut self.filter
    }

    /// Filters a node and its whole owned subtree.
    pub fn set_filtered(&mut self, id: NodeId) -> Result<()> {
        for node in self.subtree(id)? {
            self.filter.set_filtered(node);
        }
        Ok(())
    }

    /// Filters only the node itself. Used to prune externally-synthesized
    /// owners whose descendants are still needed.
    pub fn set_filtered_this_node_only(&mut self, id: NodeId) -> Result<()> {
        if !self.exists(id) {
            return Err(GraphError::InvalidId(id));
        }
        self.filter.set_filtered(id);
        Ok(())
    }

    // ---- Comment handling ----

    /// Canonicalizing constructor for comment nodes.
    pub fn comment_node(&mut self, style: CommentStyle, span: Range, text: &str) -> NodeId {
        let text_key = self.strings.set(text);
        let data = NodeData::Comment {
            style,
            text: text_key,
        };
        let key = FlyweightKey::new(data.kind()).range(&span).str_key(text_key);
        if let Some(&id) = self.flyweights.get(&key) {
            return id;
        }
        let mut node = Node::new(data);
        node.span = Some(span);
        let id = self.alloc(node);
        self.flyweights.insert(key, id);
        id
    }

    pub fn attach_comment(&mut self, owner: NodeId, comment: NodeId) -> Result<()> {
        self.node_mut(owner)?.comments.push(comment);
        Ok(())
    }

    // ---- Canonical type constructors ----

    fn canonical(&mut self, key: FlyweightKey, data: TypeNode) -> NodeId {
        if let Some(&id) = self.flyweights.get(&key) {
            return id;
        }
        let id = self.alloc(Node::new(NodeData::Type(data)));
        self.flyweights.insert(key, id);
        id
    }

    pub fn primitive_type(&mut self, kind: PrimitiveKind) -> NodeId {
        let key = FlyweightKey::new(NodeKind::PrimitiveType).primitive(kind);
        self.canonical(key, TypeNode::Primitive(kind))
    }

    pub fn void_type(&mut self) -> NodeId {
        self.canonical(FlyweightKey::new(NodeKind::VoidType), TypeNode::Void)
    }

    pub fn null_type(&mut self) -> NodeId {
        self.canonical(FlyweightKey::new(NodeKind::NullType), TypeNode::Null)
    }

    pub fn no_type(&mut self) -> NodeId {
        self.canonical(FlyweightKey::new(NodeKind::NoType), TypeNode::NoType)
    }

    pub fn error_type(&mut self) -> NodeId {
        self.canonical(FlyweightKey::new(NodeKind::ErrorType), TypeNode::Error)
    }

    pub fn array_type(&mut self, dims: u32, component: NodeId) -> NodeId {
        let key = FlyweightKey::new(NodeKind::ArrayType)
            .scalar(dims as u64)
            .id(component);
        self.canonical(key, TypeNode::Array { dims, component })
    }

    pub fn class_type(&mut self, owner: NodeId, refers_to: NodeId) -> NodeId {
        let key = FlyweightKey::new(NodeKind::ClassType).id(owner).id(refers_to);
        self.canonical(key, TypeNode::Class { owner, refers_to })
    }

    pub fn parameterized_type(
        &mut self,
        owner: NodeId,
        raw: NodeId,
        arguments: Vec<NodeId>,
    ) -> NodeId {
        let key = FlyweightKey::new(NodeKind::ParameterizedType)
            .id(owner)
            .id(raw)
            .ids(&arguments);
        self.canonical(
            key,
            TypeNode::Parameterized {
                owner,
                raw,
                arguments,
            },
        )
    }

    pub fn package_type(&mut self, refers_to: NodeId) -> NodeId {
        let key = FlyweightKey::new(NodeKind::PackageType).id(refers_to);
        self.canonical(key, TypeNode::Package { refers_to })
    }

    pub fn method_type(
        &mut self,
        return_type: NodeId,
        parameter_types: Vec<NodeId>,
        thrown_types: Vec<NodeId>,
    ) -> NodeId {
        let key = FlyweightKey::new(NodeKind::MethodType)
            .id(return_type)
            .ids(&parameter_types)
            .ids(&thrown_types);
        self.canonical(
            key,
            TypeNode::Method {
                return_type,
                parameter_types,
                thrown_types,
            },
        )
    }

    pub fn type_variable(&mut self, refers_to: NodeId) -> NodeId {
        let key = FlyweightKey::new(NodeKind::TypeVariable).id(refers_to);
        self.canonical(key, TypeNode::Variable { refers_to })
    }

    pub fn union_type(&mut self, alternatives: Vec<NodeId>) -> NodeId {
        let key = FlyweightKey::new(NodeKind::UnionType).ids(&alternatives);
        self.canonical(key, TypeNode::Union { alternatives })
    }

    pub fn wildcard_type(&mut self, bound_kind: WildcardBound, bound: NodeId) -> NodeId {
        let key = FlyweightKey::new(NodeKind::WildcardType)
            .bound(bound_kind)
            .id(bound);
        self.canonical(key, TypeNode::Wildcard { bound_kind, bound })
    }

    // ---- Structural mutation after creation ----

    /// Attaches `member` under `owner` (a package or type declaration) and
    /// takes ownership of it.
    pub fn add_member(&mut self, owner: NodeId, member: NodeId) -> Result<()> {
        let kind = self.node(owner)?.kind();
        match &mut self.node_mut(owner)?.data {
            NodeData::Package(pkg) => pkg.members.push(member),
            NodeData::Decl(DeclNode {
                data: DeclData::Type(decl),
                ..
            }) => decl.members.push(member),
            _ => {
                return Err(GraphError::KindMismatch {
                    node: owner,
                    kind,
                    edge: "members",
                })
            }
        }
        self.set_parent(member, owner)
    }

    pub fn add_package_annotation(&mut self, package: NodeId, annotation: NodeId) -> Result<()> {
        let kind = self.node(package)?.kind();
        match &mut self.node_mut(package)?.data {
            NodeData::Package(pkg) => pkg.annotations.push(annotation),
            _ => {
                return Err(GraphError::KindMismatch {
                    node: package,
                    kind,
                    edge: "annotations",
                })
            }
        }
        self.set_parent(annotation, package)
    }

    pub fn add_compilation_unit(&mut self, package: NodeId, unit: NodeId) -> Result<()> {
        let kind = self.node(package)?.kind();
        match &mut self.node_mut(package)?.data {
            NodeData::Package(pkg) => pkg.compilation_units.push(unit),
            _ => {
                return Err(GraphError::KindMismatch {
                    node: package,
                    kind,
                    edge: "compilationUnits",
                })
            }
        }
        self.set_parent(unit, package)
    }

    /// Records the (non-owning) association from a unit to a declaration
    /// lexically contained in it, and the back edge on the declaration.
    pub fn associate_type_declaration(&mut self, unit: NodeId, decl: NodeId) -> Result<()> {
        let unit_kind = self.node(unit)?.kind();
        match &mut self.node_mut(unit)?.data {
            NodeData::CompilationUnit(cu) => cu.type_declarations.push(decl),
            _ => {
                return Err(GraphError::KindMismatch {
                    node: unit,
                    kind: unit_kind,
                    edge: "typeDeclarations",
                })
            }
        }
        let decl_kind = self.node(decl)?.kind();
        match &mut self.node_mut(decl)?.data {
            NodeData::Decl(DeclNode {
                data: DeclData::Type(t),
                ..
            }) => assign_once(decl, "isInCompilationUnit", &mut t.in_compilation_unit, unit),
            _ => Err(GraphError::KindMismatch {
                node: decl,
                kind: decl_kind,
                edge: "isInCompilationUnit",
            }),
        }
    }

    // ---- Single-assignment edge backfill ----

    /// Sets the type edge computed by the type graph builder. Expressions get
    /// their value type, method-shaped declarations their method type.
    pub fn set_node_type(&mut self, id: NodeId, ty: NodeId) -> Result<()> {
        let kind = self.node(id)?.kind();
        match &mut self.node_mut(id)?.data {
            NodeData::Expr(expr) => assign_once(id, "type", &mut expr.ty, ty),
            NodeData::Decl(DeclNode {
                data: DeclData::Method(m),
                ..
            }) => assign_once(id, "methodType", &mut m.method_type, ty),
            NodeData::Decl(DeclNode {
                data: DeclData::AnnotationElement { method_type, .. },
                ..
            }) => assign_once(id, "methodType", method_type, ty),
            _ => Err(GraphError::KindMismatch {
                node: id,
                kind,
                edge: "type",
            }),
        }
    }

    /// Reads the current type edge of an expression, if any.
    pub fn node_type(&self, id: NodeId) -> Result<NodeId> {
        match &self.node(id)?.data {
            NodeData::Expr(expr) => Ok(expr.ty),
            NodeData::Decl(DeclNode {
                data: DeclData::Method(m),
                ..
            }) => Ok(m.method_type),
            NodeData::Decl(DeclNode {
                data: DeclData::AnnotationElement { method_type, .. },
                ..
            }) => Ok(*method_type),
            _ => Ok(NodeId::NONE),
        }
    }

    pub fn set_invocation_target(&mut self, id: NodeId, method: NodeId) -> Result<()> {
        let kind = self.node(id)?.kind();
        match &mut self.node_mut(id)?.data {
            NodeData::Expr(ExprNode {
                data: ExprData::MethodInvocation { invokes, .. },
                ..
            }) => assign_once(id, "invokes", invokes, method),
            _ => Err(GraphError::KindMismatch {
                node: id,
                kind,
                edge: "invokes",
            }),
        }
    }

    pub fn set_constructor(&mut self, id: NodeId, ctor: NodeId) -> Result<()> {
        let kind = self.node(id)?.kind();
        match &mut self.node_mut(id)?.data {
            NodeData::Expr(ExprNode {
                data: ExprData::NewClass { constructor, .. },
                ..
            }) => assign_once(id, "constructor", constructor, ctor),
            _ => Err(GraphError::KindMismatch {
                node: id,
                kind,
                edge: "constructor",
            }),
        }
    }

    pub fn set_identifier_target(&mut self, id: NodeId, decl: NodeId) -> Result<()> {
        let kind = self.node(id)?.kind();
        match &mut self.node_mut(id)?.data {
            NodeData::Expr(ExprNode {
                data: ExprData::Identifier { refers_to, .. },
                ..
            })
            | NodeData::Expr(ExprNode {
                data: ExprData::MemberReference { refers_to, .. },
                ..
            }) => assign_once(id, "refersTo", refers_to, decl),
            _ => Err(GraphError::KindMismatch {
                node: id,
                kind,
                edge: "refersTo",
            }),
        }
    }

    pub fn set_override_target(&mut self, id: NodeId, target: NodeId) -> Result<()> {
        let kind = self.node(id)?.kind();
        match &mut self.node_mut(id)?.data {
            NodeData::Decl(DeclNode {
                data: DeclData::Method(m),
                ..
            }) => assign_once(id, "overrides", &mut m.overrides, target),
            _ => Err(GraphError::KindMismatch {
                node: id,
                kind,
                edge: "overrides",
            }),
        }
    }

    pub fn set_jump_target(&mut self, id: NodeId, to: NodeId) -> Result<()> {
        let kind = self.node(id)?.kind();
        match &mut self.node_mut(id)?.data {
            NodeData::Stmt(StmtNode::Break { target, .. })
            | NodeData::Stmt(StmtNode::Continue { target, .. }) => {
                assign_once(id, "target", target, to)
            }
            _ => Err(GraphError::KindMismatch {
                node: id,
                kind,
                edge: "target",
            }),
        }
    }

}

/// A single-valued edge, once set, cannot be reassigned; an attempt is a
/// detectable bug, not a silent overwrite.
fn assign_once(node: NodeId, edge: &'static str, slot: &mut NodeId, value: NodeId) -> Result<()> {
    if slot.is_some() && *slot != value {
        return Err(GraphError::EdgeReassigned {
            node,
            edge,
            old: *slot,
            new: value,
        });
    }
    *slot = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_id_one() {
        let graph = Graph::new();
        assert_eq!(graph.root(), NodeId(1));
        assert_eq!(graph.kind(graph.root()).unwrap(), NodeKind::Package);
    }

    #[test]
    fn test_ids_are_dense_and_monotonic() {
        let mut graph = Graph::new();
        let a = graph.insert(Node::new(NodeData::Stmt(StmtNode::Empty))).unwrap();
        let b = graph.insert(Node::new(NodeData::Stmt(StmtNode::Empty))).unwrap();
        assert_eq!(a.0 + 1, b.0);
        assert!(graph.exists(a));
        assert!(!graph.exists(NodeId(999)));
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let graph = Graph::new();
        assert!(matches!(
            graph.node(NodeId(42)),
            Err(GraphError::InvalidId(NodeId(42)))
        ));
    }

    #[test]
    fn test_flyweights_are_canonical() {
        let mut graph = Graph::new();
        let int_a = graph.primitive_type(PrimitiveKind::Int);
        let int_b = graph.primitive_type(PrimitiveKind::Int);
        assert_eq!(int_a, int_b);

        let arr_a = graph.array_type(1, int_a);
        let arr_b = graph.array_type(1, int_b);
        let arr_c = graph.array_type(2, int_a);
        assert_eq!(arr_a, arr_b);
        assert_ne!(arr_a, arr_c);

        let wild_a = graph.wildcard_type(WildcardBound::Extends, arr_a);
        let wild_b = graph.wildcard_type(WildcardBound::Extends, arr_b);
        assert_eq!(wild_a, wild_b);
        let union_a = graph.union_type(vec![int_a, arr_a]);
        let union_b = graph.union_type(vec![int_a, arr_a]);
        assert_eq!(union_a, union_b);
    }

    #[test]
    fn test_single_assignment_edge_fails_on_reassign() {
        let mut graph = Graph::new();
        let jump = graph
            .insert(Node::new(NodeData::Stmt(StmtNode::Break {
                label: None,
                label_span: None,
                target: NodeId::NONE,
            })))
            .unwrap();
        let loop_a = graph
            .insert(Node::new(NodeData::Stmt(StmtNode::While {
                condition: NodeId::NONE,
                body: NodeId::NONE,
            })))
            .unwrap();
        let loop_b = graph
            .insert(Node::new(NodeData::Stmt(StmtNode::While {
                condition: NodeId::NONE,
                body: NodeId::NONE,
            })))
            .unwrap();

        graph.set_jump_target(jump, loop_a).unwrap();
        let err = graph.set_jump_target(jump, loop_b).unwrap_err();
        assert!(matches!(err, GraphError::EdgeReassigned { .. }));
    }

    #[test]
    fn test_iter_skips_filtered_when_filter_is_on() {
        let mut graph = Graph::new();
        let a = graph.insert(Node::new(NodeData::Stmt(StmtNode::Empty))).unwrap();
        let b = graph.insert(Node::new(NodeData::Stmt(StmtNode::Empty))).unwrap();

        graph.set_filtered_this_node_only(a).unwrap();
        assert_eq!(graph.iter().count(), 3, "filter is off by default");

        graph.turn_filter_on();
        let visible: Vec<_> = graph.iter().map(|(id, _)| id).collect();
        assert!(!visible.contains(&a));
        assert!(visible.contains(&b));
    }

    #[test]
    fn test_subtree_filtering() {
        let mut graph = Graph::new();
        let inner = graph
            .insert(Node::new(NodeData::Stmt(StmtNode::Empty)))
            .unwrap();
        let block = graph
            .insert(Node::new(NodeData::Stmt(StmtNode::Block {
                statements: vec![inner],
            })))
            .unwrap();

        graph.set_filtered(block).unwrap();
        graph.turn_filter_on();
        assert!(graph.is_filtered(block));
        assert!(graph.is_filtered(inner), "subtree is filtered transitively");
    }

    #[test]
    fn test_insert_links_parents_and_rejects_double_ownership() {
        let mut graph = Graph::new();
        let child = graph.insert(Node::new(NodeData::Stmt(StmtNode::Empty))).unwrap();
        let block = graph
            .insert(Node::new(NodeData::Stmt(StmtNode::Block {
                statements: vec![child],
            })))
            .unwrap();
        assert_eq!(graph.parent(child).unwrap(), block);

        let err = graph
            .insert(Node::new(NodeData::Stmt(StmtNode::Block {
                statements: vec![child],
            })))
            .unwrap_err();
        assert!(matches!(err, GraphError::EdgeReassigned { .. }));
    }
}
