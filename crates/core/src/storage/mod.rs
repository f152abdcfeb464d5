//! Graph persistence.
//!
//! Layout: header block (format tag, API/binary version, metadata), then one
//! record per visible node (id, kind tag, kind-specific fields; every edge
//! list is zero-terminated), a zero id/kind terminator record, and finally
//! the string table. The companion filter file is handled by
//! [`crate::graph::FilterMask`].
//!
//! Loading is strict: the version markers are checked before any node data is
//! read, and a reloaded graph is observationally identical to the saved one.

pub mod header;
pub mod io;
pub mod strtable;

pub use header::Header;

use crate::error::{GraphError, Result};
use crate::graph::{
    AssignOperator, CommentStyle, CompilationUnitNode, DeclData, DeclNode, ExprData, ExprNode,
    Graph, InfixOperator, LiteralValue, MemberRefMode, MethodData, MethodKind, Modifiers, Node,
    NodeData, NodeId, NodeKind, PackageNode, Point, PostfixOperator, PrefixOperator,
    PrimitiveKind, Range, StmtNode, TypeDeclData, TypeNode, TypeShape, VarShape, VariableData,
    Visibility, WildcardBound,
};
use crate::storage::io::{ReadExt, WriteExt};
use crate::storage::strtable::{StrKey, StrTable};
use smol_str::SmolStr;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Saves every currently visible node. The caller decides the view by
/// turning the filter on or off beforehand.
pub fn save(graph: &Graph, header: &Header, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut w = BufWriter::new(file);

    header.write(&mut w)?;
    for (id, node) in graph.iter() {
        write_node(&mut w, graph, id, node)?;
    }
    // end mark
    w.write_u32(0)?;
    w.write_u16(0)?;
    graph.strings().save(&mut w)?;
    w.flush()?;
    Ok(())
}

pub fn load(path: &Path) -> Result<(Graph, Header)> {
    let file = std::fs::File::open(path)?;
    let mut r = BufReader::new(file);

    let header = Header::read(&mut r)?;

    let mut nodes: Vec<Option<Node>> = vec![None];
    loop {
        let id = NodeId(r.read_u32()?);
        let tag = r.read_u16()?;
        if id.is_none() && tag == 0 {
            break;
        }
        let kind = NodeKind::from_u16(tag)
            .ok_or_else(|| GraphError::Format(format!("unknown kind tag {tag} for node {id}")))?;
        let node = read_node(&mut r, kind)?;
        if id.index() < nodes.len() {
            return Err(GraphError::Format(format!(
                "node records out of order at {id}"
            )));
        }
        nodes.resize_with(id.index(), || None);
        nodes.push(Some(node));
    }
    let strings = StrTable::load(&mut r)?;

    let mut graph = Graph::from_parts(nodes, strings)?;
    link_parents(&mut graph)?;
    Ok((graph, header))
}

/// Ownership is not serialized; it is reconstructed from the owned-child
/// lists after all records are in.
fn link_parents(graph: &mut Graph) -> Result<()> {
    let ids: Vec<NodeId> = graph.iter().map(|(id, _)| id).collect();
    for id in ids {
        for child in graph.owned_children_of(id)? {
            if graph.exists(child) {
                graph.node_mut(child)?.parent = id;
            }
        }
    }
    Ok(())
}

// ---------- Save ----------

struct NodeWriter<'a, W: Write> {
    w: &'a mut W,
    graph: &'a Graph,
}

impl<'a, W: Write> NodeWriter<'a, W> {
    /// Single edge; a filtered target is written as the null id so partition
    /// views stay self-contained.
    fn edge(&mut self, id: NodeId) -> Result<()> {
        let id = if self.graph.is_filtered(id) {
            NodeId::NONE
        } else {
            id
        };
        self.w.write_u32(id.0)
    }

    /// Zero-terminated edge list; filtered targets are dropped.
    fn edges(&mut self, ids: &[NodeId]) -> Result<()> {
        for id in ids {
            if id.is_some() && !self.graph.is_filtered(*id) {
                self.w.write_u32(id.0)?;
            }
        }
        self.w.write_u32(0)
    }

    fn string(&mut self, s: &str) -> Result<()> {
        self.w.write_str(s)
    }

    fn opt_string(&mut self, s: &Option<SmolStr>) -> Result<()> {
        match s {
            Some(s) => {
                self.w.write_u8(1)?;
                self.w.write_str(s)
            }
            None => self.w.write_u8(0),
        }
    }

    fn range(&mut self, range: &Range) -> Result<()> {
        self.w.write_u32(range.path.0)?;
        for point in [range.start, range.end, range.wide_start, range.wide_end] {
            self.w.write_u32(point.line)?;
            self.w.write_u32(point.col)?;
        }
        Ok(())
    }

    fn opt_range(&mut self, range: &Option<Range>) -> Result<()> {
        match range {
            Some(range) => {
                self.w.write_u8(1)?;
                self.range(range)
            }
            None => self.w.write_u8(0),
        }
    }
}

fn write_node<W: Write>(w: &mut W, graph: &Graph, id: NodeId, node: &Node) -> Result<()> {
    w.write_u32(id.0)?;
    w.write_u16(node.kind() as u16)?;

    let mut nw = NodeWriter { w, graph };
    nw.edges(&node.comments)?;
    nw.opt_range(&node.span)?;
    let flags = node.compiler_generated as u8 | (node.tool_generated as u8) << 1;
    nw.w.write_u8(flags)?;

    match &node.data {
        NodeData::Comment { text, .. } => nw.w.write_u32(text.0)?,
        NodeData::Package(pkg) => {
            nw.string(&pkg.name)?;
            nw.string(&pkg.qualified_name)?;
            nw.edges(&pkg.annotations)?;
            nw.edges(&pkg.compilation_units)?;
            nw.edges(&pkg.members)?;
        }
        NodeData::CompilationUnit(cu) => {
            nw.edge(cu.package_declaration)?;
            nw.edges(&cu.imports)?;
            nw.edges(&cu.others)?;
            nw.edges(&cu.type_declarations)?;
            nw.w.write_u32(cu.lloc)?;
        }
        NodeData::PackageDeclaration {
            package_name,
            refers_to,
        } => {
            nw.edge(*package_name)?;
            nw.edge(*refers_to)?;
        }
        NodeData::Import { is_static, target } => {
            nw.w.write_u8(*is_static as u8)?;
            nw.edge(*target)?;
        }
        NodeData::Decl(decl) => {
            nw.string(&decl.name)?;
            nw.opt_range(&decl.name_span)?;
            nw.w.write_u8(encode_modifiers(&decl.modifiers))?;
            nw.edges(&decl.annotations)?;
            match &decl.data {
                DeclData::Type(t) => {
                    nw.string(&t.binary_name)?;
                    nw.edges(&t.type_parameters)?;
                    nw.edge(t.superclass)?;
                    nw.edges(&t.super_interfaces)?;
                    nw.edges(&t.members)?;
                    nw.edges(&t.others)?;
                    nw.edge(t.in_compilation_unit)?;
                    nw.w.write_u32(t.lloc)?;
                }
                DeclData::Method(m) => {
                    nw.w.write_u8(m.method_kind as u8)?;
                    nw.edges(&m.type_parameters)?;
                    nw.edges(&m.parameters)?;
                    nw.edge(m.return_type)?;
                    nw.edges(&m.thrown_exceptions)?;
                    nw.edge(m.body)?;
                    nw.edge(m.method_type)?;
                    nw.edge(m.overrides)?;
                    nw.w.write_u32(m.lloc)?;
                }
                DeclData::AnnotationElement {
                    return_type,
                    default_value,
                    method_type,
                } => {
                    nw.edge(*return_type)?;
                    nw.edge(*default_value)?;
                    nw.edge(*method_type)?;
                }
                DeclData::Variable(v) => {
                    nw.edge(v.var_type)?;
                    nw.edge(v.init)?;
                }
                DeclData::TypeParameter { bounds } => nw.edges(bounds)?,
            }
        }
        NodeData::InitializerBlock { body, lloc, .. } => {
            nw.edge(*body)?;
            nw.w.write_u32(*lloc)?;
        }
        NodeData::Stmt(stmt) => write_stmt(&mut nw, stmt)?,
        NodeData::Expr(expr) => {
            nw.edge(expr.ty)?;
            write_expr(&mut nw, &expr.data)?;
        }
        NodeData::Type(ty) => write_type(&mut nw, ty)?,
    }
    Ok(())
}

fn write_stmt<W: Write>(nw: &mut NodeWriter<'_, W>, stmt: &StmtNode) -> Result<()> {
    match stmt {
        StmtNode::Assert { condition, detail } => {
            nw.edge(*condition)?;
            nw.edge(*detail)
        }
        StmtNode::BasicFor {
            initializers,
            condition,
            updates,
            body,
            first_semi,
            second_semi,
        } => {
            nw.edges(initializers)?;
            nw.edge(*condition)?;
            nw.edges(updates)?;
            nw.edge(*body)?;
            nw.opt_range(first_semi)?;
            nw.opt_range(second_semi)
        }
        StmtNode::Block { statements } | StmtNode::Default { statements } => {
            nw.edges(statements)
        }
        StmtNode::Break {
            label,
            label_span,
            target,
        }
        | StmtNode::Continue {
            label,
            label_span,
            target,
        } => {
            nw.opt_string(label)?;
            nw.opt_range(label_span)?;
            nw.edge(*target)
        }
        StmtNode::Case {
            expression,
            statements,
        } => {
            nw.edge(*expression)?;
            nw.edges(statements)
        }
        StmtNode::Do { condition, body } | StmtNode::While { condition, body } => {
            nw.edge(*condition)?;
            nw.edge(*body)
        }
        StmtNode::Empty => Ok(()),
        StmtNode::EnhancedFor {
            parameter,
            expression,
            body,
        } => {
            nw.edge(*parameter)?;
            nw.edge(*expression)?;
            nw.edge(*body)
        }
        StmtNode::ExpressionStatement { expression } | StmtNode::Throw { expression } => {
            nw.edge(*expression)
        }
        StmtNode::Handler { parameter, block } => {
            nw.edge(*parameter)?;
            nw.edge(*block)
        }
        StmtNode::If {
            condition,
            then_branch,
            else_branch,
        } => {
            nw.edge(*condition)?;
            nw.edge(*then_branch)?;
            nw.edge(*else_branch)
        }
        StmtNode::LabeledStatement { label, statement } => {
            nw.string(label)?;
            nw.edge(*statement)
        }
        StmtNode::Return { expression } => nw.edge(*expression),
        StmtNode::Switch { condition, cases } => {
            nw.edge(*condition)?;
            nw.edges(cases)
        }
        StmtNode::Synchronized { lock, block } => {
            nw.edge(*lock)?;
            nw.edge(*block)
        }
        StmtNode::Try {
            resources,
            block,
            handlers,
            finally_block,
        } => {
            nw.edges(resources)?;
            nw.edge(*block)?;
            nw.edges(handlers)?;
            nw.edge(*finally_block)
        }
    }
}

fn write_expr<W: Write>(nw: &mut NodeWriter<'_, W>, expr: &ExprData) -> Result<()> {
    match expr {
        ExprData::ArrayAccess { array, index } => {
            nw.edge(*array)?;
            nw.edge(*index)
        }
        ExprData::Assignment {
            operator,
            left,
            right,
        } => {
            nw.w.write_u8(*operator as u8)?;
            nw.edge(*left)?;
            nw.edge(*right)
        }
        ExprData::ClassLiteral { component } | ExprData::ArrayTypeExpr { component } => {
            nw.edge(*component)
        }
        ExprData::Conditional {
            condition,
            true_expr,
            false_expr,
        } => {
            nw.edge(*condition)?;
            nw.edge(*true_expr)?;
            nw.edge(*false_expr)
        }
        ExprData::Erroneous { errors } | ExprData::ErroneousTypeExpr { errors } => {
            nw.edges(errors)
        }
        ExprData::FieldAccess { left, right } => {
            nw.edge(*left)?;
            nw.edge(*right)
        }
        ExprData::Identifier { name, refers_to } => {
            nw.string(name)?;
            nw.edge(*refers_to)
        }
        ExprData::Infix {
            operator,
            left,
            right,
        } => {
            nw.w.write_u8(*operator as u8)?;
            nw.edge(*left)?;
            nw.edge(*right)
        }
        ExprData::InstanceOf {
            operand,
            type_operand,
        } => {
            nw.edge(*operand)?;
            nw.edge(*type_operand)
        }
        ExprData::Lambda {
            parameters,
            body,
            lloc,
        } => {
            nw.edges(parameters)?;
            nw.edge(*body)?;
            nw.w.write_u32(*lloc)
        }
        ExprData::Literal { value, text } => {
            write_literal(nw, value)?;
            nw.string(text)
        }
        ExprData::MarkerAnnotation { annotation_name } => nw.edge(*annotation_name),
        ExprData::MemberReference {
            mode,
            qualifier,
            name,
            type_arguments,
            refers_to,
        } => {
            nw.w.write_u8(*mode as u8)?;
            nw.string(name)?;
            nw.edge(*qualifier)?;
            nw.edges(type_arguments)?;
            nw.edge(*refers_to)
        }
        ExprData::MethodInvocation {
            operand,
            type_arguments,
            arguments,
            invokes,
        } => {
            nw.edge(*operand)?;
            nw.edges(type_arguments)?;
            nw.edges(arguments)?;
            nw.edge(*invokes)
        }
        ExprData::NewArray {
            component_type,
            dimensions,
            initializers,
        } => {
            nw.edge(*component_type)?;
            nw.edges(dimensions)?;
            nw.edges(initializers)
        }
        ExprData::NewClass {
            enclosing,
            type_name,
            type_arguments,
            arguments,
            anonymous_class,
            constructor,
        } => {
            nw.edge(*enclosing)?;
            nw.edge(*type_name)?;
            nw.edges(type_arguments)?;
            nw.edges(arguments)?;
            nw.edge(*anonymous_class)?;
            nw.edge(*constructor)
        }
        ExprData::NormalAnnotation {
            annotation_name,
            arguments,
        } => {
            nw.edge(*annotation_name)?;
            nw.edges(arguments)
        }
        ExprData::Paren { operand } => nw.edge(*operand),
        ExprData::Postfix { operator, operand } => {
            nw.w.write_u8(*operator as u8)?;
            nw.edge(*operand)
        }
        ExprData::Prefix { operator, operand } => {
            nw.w.write_u8(*operator as u8)?;
            nw.edge(*operand)
        }
        ExprData::SingleElementAnnotation {
            annotation_name,
            argument,
        } => {
            nw.edge(*annotation_name)?;
            nw.edge(*argument)
        }
        ExprData::Super | ExprData::This | ExprData::ExternalTypeExpr => Ok(()),
        ExprData::TypeCast {
            type_operand,
            operand,
        } => {
            nw.edge(*type_operand)?;
            nw.edge(*operand)
        }
        ExprData::PrimitiveTypeExpr { kind } => nw.w.write_u8(*kind as u8),
        ExprData::QualifiedTypeExpr { qualifier, simple } => {
            nw.edge(*qualifier)?;
            nw.edge(*simple)
        }
        ExprData::SimpleTypeExpr { name } => nw.string(name),
        ExprData::TypeApplyExpr {
            raw,
            type_arguments,
        } => {
            nw.edge(*raw)?;
            nw.edges(type_arguments)
        }
        ExprData::TypeUnionExpr { alternatives } => nw.edges(alternatives),
        ExprData::WildcardExpr { bound_kind, bound } => {
            nw.w.write_u8(*bound_kind as u8)?;
            nw.edge(*bound)
        }
    }
}

fn write_type<W: Write>(nw: &mut NodeWriter<'_, W>, ty: &TypeNode) -> Result<()> {
    match ty {
        TypeNode::Primitive(kind) => nw.w.write_u8(*kind as u8),
        TypeNode::Void | TypeNode::Null | TypeNode::NoType | TypeNode::Error => Ok(()),
        TypeNode::Array { dims, component } => {
            nw.w.write_u32(*dims)?;
            nw.edge(*component)
        }
        TypeNode::Class { owner, refers_to } => {
            nw.edge(*owner)?;
            nw.edge(*refers_to)
        }
        TypeNode::Parameterized {
            owner,
            raw,
            arguments,
        } => {
            nw.edge(*owner)?;
            nw.edge(*raw)?;
            nw.edges(arguments)
        }
        TypeNode::Package { refers_to } | TypeNode::Variable { refers_to } => nw.edge(*refers_to),
        TypeNode::Method {
            return_type,
            parameter_types,
            thrown_types,
        } => {
            nw.edge(*return_type)?;
            nw.edges(parameter_types)?;
            nw.edges(thrown_types)
        }
        TypeNode::Union { alternatives } => nw.edges(alternatives),
        TypeNode::Wildcard { bound_kind, bound } => {
            nw.w.write_u8(*bound_kind as u8)?;
            nw.edge(*bound)
        }
    }
}

fn write_literal<W: Write>(nw: &mut NodeWriter<'_, W>, value: &LiteralValue) -> Result<()> {
    match value {
        LiteralValue::Boolean(v) => {
            nw.w.write_u8(0)?;
            nw.w.write_u8(*v as u8)
        }
        LiteralValue::Character(v) => {
            nw.w.write_u8(1)?;
            nw.w.write_u32(*v as u32)
        }
        LiteralValue::Integer(v) => {
            nw.w.write_u8(2)?;
            nw.w.write_u64(*v as u64)
        }
        LiteralValue::Floating(v) => {
            nw.w.write_u8(3)?;
            nw.w.write_u64(v.to_bits())
        }
        LiteralValue::Str(v) => {
            nw.w.write_u8(4)?;
            nw.w.write_str(v)
        }
        LiteralValue::Null => nw.w.write_u8(5),
    }
}

fn encode_modifiers(m: &Modifiers) -> u8 {
    let vis = match m.visibility {
        Visibility::PackagePrivate => 0,
        Visibility::Public => 1,
        Visibility::Protected => 2,
        Visibility::Private => 3,
    };
    vis | (m.is_static as u8) << 2 | (m.is_final as u8) << 3 | (m.is_abstract as u8) << 4
}

// ---------- Load ----------

struct NodeReader<'a, R: Read> {
    r: &'a mut R,
}

impl<'a, R: Read> NodeReader<'a, R> {
    fn edge(&mut self) -> Result<NodeId> {
        Ok(NodeId(self.r.read_u32()?))
    }

    fn edges(&mut self) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        loop {
            let id = self.r.read_u32()?;
            if id == 0 {
                return Ok(out);
            }
            out.push(NodeId(id));
        }
    }

    fn string(&mut self) -> Result<SmolStr> {
        Ok(SmolStr::new(self.r.read_str()?))
    }

    fn opt_string(&mut self) -> Result<Option<SmolStr>> {
        match self.r.read_u8()? {
            0 => Ok(None),
            _ => Ok(Some(self.string()?)),
        }
    }

    fn range(&mut self) -> Result<Range> {
        let path = StrKey(self.r.read_u32()?);
        let mut points = [Point::default(); 4];
        for point in &mut points {
            point.line = self.r.read_u32()?;
            point.col = self.r.read_u32()?;
        }
        Ok(Range {
            path,
            start: points[0],
            end: points[1],
            wide_start: points[2],
            wide_end: points[3],
        })
    }

    fn opt_range(&mut self) -> Result<Option<Range>> {
        match self.r.read_u8()? {
            0 => Ok(None),
            _ => Ok(Some(self.range()?)),
        }
    }
}

fn read_node<R: Read>(r: &mut R, kind: NodeKind) -> Result<Node> {
    let mut nr = NodeReader { r };

    let comments = nr.edges()?;
    let span = nr.opt_range()?;
    let flags = nr.r.read_u8()?;

    let data = read_data(&mut nr, kind)?;
    let mut node = Node::new(data);
    node.comments = comments;
    node.span = span;
    node.compiler_generated = flags & 1 != 0;
    node.tool_generated = flags & 2 != 0;
    Ok(node)
}

fn read_data<R: Read>(nr: &mut NodeReader<'_, R>, kind: NodeKind) -> Result<NodeData> {
    use NodeKind as K;
    Ok(match kind {
        K::LineComment | K::BlockComment | K::DocComment => NodeData::Comment {
            style: match kind {
                K::LineComment => CommentStyle::Line,
                K::BlockComment => CommentStyle::Block,
                _ => CommentStyle::Doc,
            },
            text: StrKey(nr.r.read_u32()?),
        },
        K::Package => NodeData::Package(PackageNode {
            name: nr.string()?,
            qualified_name: nr.string()?,
            annotations: nr.edges()?,
            compilation_units: nr.edges()?,
            members: nr.edges()?,
        }),
        K::CompilationUnit => NodeData::CompilationUnit(CompilationUnitNode {
            package_declaration: nr.edge()?,
            imports: nr.edges()?,
            others: nr.edges()?,
            type_declarations: nr.edges()?,
            lloc: nr.r.read_u32()?,
        }),
        K::PackageDeclaration => NodeData::PackageDeclaration {
            package_name: nr.edge()?,
            refers_to: nr.edge()?,
        },
        K::Import => NodeData::Import {
            is_static: nr.r.read_u8()? != 0,
            target: nr.edge()?,
        },
        K::Class | K::ClassGeneric | K::Interface | K::InterfaceGeneric | K::Enum
        | K::AnnotationType | K::AnonymousClass | K::Method | K::MethodGeneric
        | K::AnnotationTypeElement | K::Variable | K::Parameter | K::EnumConstant
        | K::TypeParameter => read_decl(nr, kind)?,
        K::InstanceInitializer | K::StaticInitializer => NodeData::InitializerBlock {
            is_static: kind == K::StaticInitializer,
            body: nr.edge()?,
            lloc: nr.r.read_u32()?,
        },
        K::Assert | K::BasicFor | K::Block | K::Break | K::Case | K::Continue | K::Default
        | K::Do | K::Empty | K::EnhancedFor | K::ExpressionStatement | K::Handler | K::If
        | K::LabeledStatement | K::Return | K::Switch | K::Synchronized | K::Throw | K::Try
        | K::While => NodeData::Stmt(read_stmt(nr, kind)?),
        K::ArrayType | K::ClassType | K::ErrorType | K::MethodType | K::NoType | K::NullType
        | K::PackageType | K::ParameterizedType | K::PrimitiveType | K::TypeVariable
        | K::UnionType | K::VoidType | K::WildcardType => NodeData::Type(read_type(nr, kind)?),
        _ => {
            let ty = nr.edge()?;
            NodeData::Expr(ExprNode {
                ty,
                data: read_expr(nr, kind)?,
            })
        }
    })
}

fn read_decl<R: Read>(nr: &mut NodeReader<'_, R>, kind: NodeKind) -> Result<NodeData> {
    use NodeKind as K;
    let name = nr.string()?;
    let name_span = nr.opt_range()?;
    let modifiers = decode_modifiers(nr.r.read_u8()?)?;
    let annotations = nr.edges()?;

    let data = match kind {
        K::Class | K::ClassGeneric | K::Interface | K::InterfaceGeneric | K::Enum
        | K::AnnotationType | K::AnonymousClass => DeclData::Type(TypeDeclData {
            shape: match kind {
                K::Class | K::ClassGeneric => TypeShape::Class,
                K::Interface | K::InterfaceGeneric => TypeShape::Interface,
                K::Enum => TypeShape::Enum,
                K::AnnotationType => TypeShape::Annotation,
                _ => TypeShape::Anonymous,
            },
            is_generic: matches!(kind, K::ClassGeneric | K::InterfaceGeneric),
            binary_name: nr.string()?,
            type_parameters: nr.edges()?,
            superclass: nr.edge()?,
            super_interfaces: nr.edges()?,
            members: nr.edges()?,
            others: nr.edges()?,
            in_compilation_unit: nr.edge()?,
            lloc: nr.r.read_u32()?,
        }),
        K::Method | K::MethodGeneric => DeclData::Method(MethodData {
            is_generic: kind == K::MethodGeneric,
            method_kind: match nr.r.read_u8()? {
                0 => MethodKind::Normal,
                1 => MethodKind::Constructor,
                other => {
                    return Err(GraphError::Format(format!("invalid method kind {other}")))
                }
            },
            type_parameters: nr.edges()?,
            parameters: nr.edges()?,
            return_type: nr.edge()?,
            thrown_exceptions: nr.edges()?,
            body: nr.edge()?,
            method_type: nr.edge()?,
            overrides: nr.edge()?,
            lloc: nr.r.read_u32()?,
        }),
        K::AnnotationTypeElement => DeclData::AnnotationElement {
            return_type: nr.edge()?,
            default_value: nr.edge()?,
            method_type: nr.edge()?,
        },
        K::Variable | K::Parameter | K::EnumConstant => DeclData::Variable(VariableData {
            shape: match kind {
                K::Variable => VarShape::Field,
                K::Parameter => VarShape::Parameter,
                _ => VarShape::EnumConstant,
            },
            var_type: nr.edge()?,
            init: nr.edge()?,
        }),
        _ => DeclData::TypeParameter {
            bounds: nr.edges()?,
        },
    };

    Ok(NodeData::Decl(DeclNode {
        name,
        name_span,
        modifiers,
        annotations,
        data,
    }))
}

fn read_stmt<R: Read>(nr: &mut NodeReader<'_, R>, kind: NodeKind) -> Result<StmtNode> {
    use NodeKind as K;
    Ok(match kind {
        K::Assert => StmtNode::Assert {
            condition: nr.edge()?,
            detail: nr.edge()?,
        },
        K::BasicFor => StmtNode::BasicFor {
            initializers: nr.edges()?,
            condition: nr.edge()?,
            updates: nr.edges()?,
            body: nr.edge()?,
            first_semi: nr.opt_range()?,
            second_semi: nr.opt_range()?,
        },
        K::Block => StmtNode::Block {
            statements: nr.edges()?,
        },
        K::Break => {
            let label = nr.opt_string()?;
            let label_span = nr.opt_range()?;
            StmtNode::Break {
                label,
                label_span,
                target: nr.edge()?,
            }
        }
        K::Case => StmtNode::Case {
            expression: nr.edge()?,
            statements: nr.edges()?,
        },
        K::Continue => {
            let label = nr.opt_string()?;
            let label_span = nr.opt_range()?;
            StmtNode::Continue {
                label,
                label_span,
                target: nr.edge()?,
            }
        }
        K::Default => StmtNode::Default {
            statements: nr.edges()?,
        },
        K::Do => StmtNode::Do {
            condition: nr.edge()?,
            body: nr.edge()?,
        },
        K::Empty => StmtNode::Empty,
        K::EnhancedFor => StmtNode::EnhancedFor {
            parameter: nr.edge()?,
            expression: nr.edge()?,
            body: nr.edge()?,
        },
        K::ExpressionStatement => StmtNode::ExpressionStatement {
            expression: nr.edge()?,
        },
        K::Handler => StmtNode::Handler {
            parameter: nr.edge()?,
            block: nr.edge()?,
        },
        K::If => StmtNode::If {
            condition: nr.edge()?,
            then_branch: nr.edge()?,
            else_branch: nr.edge()?,
        },
        K::LabeledStatement => StmtNode::LabeledStatement {
            label: nr.string()?,
            statement: nr.edge()?,
        },
        K::Return => StmtNode::Return {
            expression: nr.edge()?,
        },
        K::Switch => StmtNode::Switch {
            condition: nr.edge()?,
            cases: nr.edges()?,
        },
        K::Synchronized => StmtNode::Synchronized {
            lock: nr.edge()?,
            block: nr.edge()?,
        },
        K::Throw => StmtNode::Throw {
            expression: nr.edge()?,
        },
        K::Try => StmtNode::Try {
            resources: nr.edges()?,
            block: nr.edge()?,
            handlers: nr.edges()?,
            finally_block: nr.edge()?,
        },
        _ => StmtNode::While {
            condition: nr.edge()?,
            body: nr.edge()?,
        },
    })
}

fn read_expr<R: Read>(nr: &mut NodeReader<'_, R>, kind: NodeKind) -> Result<ExprData> {
    use NodeKind as K;
    Ok(match kind {
        K::ArrayAccess => ExprData::ArrayAccess {
            array: nr.edge()?,
            index: nr.edge()?,
        },
        K::Assignment => ExprData::Assignment {
            operator: decode_assign_op(nr.r.read_u8()?)?,
            left: nr.edge()?,
            right: nr.edge()?,
        },
        K::ClassLiteral => ExprData::ClassLiteral {
            component: nr.edge()?,
        },
        K::Conditional => ExprData::Conditional {
            condition: nr.edge()?,
            true_expr: nr.edge()?,
            false_expr: nr.edge()?,
        },
        K::Erroneous => ExprData::Erroneous {
            errors: nr.edges()?,
        },
        K::FieldAccess => ExprData::FieldAccess {
            left: nr.edge()?,
            right: nr.edge()?,
        },
        K::Identifier => ExprData::Identifier {
            name: nr.string()?,
            refers_to: nr.edge()?,
        },
        K::InfixExpression => ExprData::Infix {
            operator: decode_infix_op(nr.r.read_u8()?)?,
            left: nr.edge()?,
            right: nr.edge()?,
        },
        K::InstanceOf => ExprData::InstanceOf {
            operand: nr.edge()?,
            type_operand: nr.edge()?,
        },
        K::Lambda => ExprData::Lambda {
            parameters: nr.edges()?,
            body: nr.edge()?,
            lloc: nr.r.read_u32()?,
        },
        K::Literal => {
            let value = read_literal(nr)?;
            ExprData::Literal {
                value,
                text: nr.string()?,
            }
        }
        K::MarkerAnnotation => ExprData::MarkerAnnotation {
            annotation_name: nr.edge()?,
        },
        K::MemberReference => ExprData::MemberReference {
            mode: match nr.r.read_u8()? {
                0 => MemberRefMode::Invoke,
                _ => MemberRefMode::New,
            },
            name: nr.string()?,
            qualifier: nr.edge()?,
            type_arguments: nr.edges()?,
            refers_to: nr.edge()?,
        },
        K::MethodInvocation => ExprData::MethodInvocation {
            operand: nr.edge()?,
            type_arguments: nr.edges()?,
            arguments: nr.edges()?,
            invokes: nr.edge()?,
        },
        K::NewArray => ExprData::NewArray {
            component_type: nr.edge()?,
            dimensions: nr.edges()?,
            initializers: nr.edges()?,
        },
        K::NewClass => ExprData::NewClass {
            enclosing: nr.edge()?,
            type_name: nr.edge()?,
            type_arguments: nr.edges()?,
            arguments: nr.edges()?,
            anonymous_class: nr.edge()?,
            constructor: nr.edge()?,
        },
        K::NormalAnnotation => ExprData::NormalAnnotation {
            annotation_name: nr.edge()?,
            arguments: nr.edges()?,
        },
        K::ParenthesizedExpression => ExprData::Paren { operand: nr.edge()? },
        K::PostfixExpression => ExprData::Postfix {
            operator: match nr.r.read_u8()? {
                0 => PostfixOperator::Increment,
                _ => PostfixOperator::Decrement,
            },
            operand: nr.edge()?,
        },
        K::PrefixExpression => ExprData::Prefix {
            operator: decode_prefix_op(nr.r.read_u8()?)?,
            operand: nr.edge()?,
        },
        K::SingleElementAnnotation => ExprData::SingleElementAnnotation {
            annotation_name: nr.edge()?,
            argument: nr.edge()?,
        },
        K::Super => ExprData::Super,
        K::This => ExprData::This,
        K::TypeCast => ExprData::TypeCast {
            type_operand: nr.edge()?,
            operand: nr.edge()?,
        },
        K::ArrayTypeExpression => ExprData::ArrayTypeExpr {
            component: nr.edge()?,
        },
        K::ErroneousTypeExpression => ExprData::ErroneousTypeExpr {
            errors: nr.edges()?,
        },
        K::ExternalTypeExpression => ExprData::ExternalTypeExpr,
        K::PrimitiveTypeExpression => ExprData::PrimitiveTypeExpr {
            kind: decode_primitive(nr.r.read_u8()?)?,
        },
        K::QualifiedTypeExpression => ExprData::QualifiedTypeExpr {
            qualifier: nr.edge()?,
            simple: nr.edge()?,
        },
        K::SimpleTypeExpression => ExprData::SimpleTypeExpr { name: nr.string()? },
        K::TypeApplyExpression => ExprData::TypeApplyExpr {
            raw: nr.edge()?,
            type_arguments: nr.edges()?,
        },
        K::TypeUnionExpression => ExprData::TypeUnionExpr {
            alternatives: nr.edges()?,
        },
        K::WildcardExpression => ExprData::WildcardExpr {
            bound_kind: decode_bound(nr.r.read_u8()?)?,
            bound: nr.edge()?,
        },
        other => {
            return Err(GraphError::Format(format!(
                "kind {other:?} is not an expression"
            )))
        }
    })
}

fn read_type<R: Read>(nr: &mut NodeReader<'_, R>, kind: NodeKind) -> Result<TypeNode> {
    use NodeKind as K;
    Ok(match kind {
        K::PrimitiveType => TypeNode::Primitive(decode_primitive(nr.r.read_u8()?)?),
        K::VoidType => TypeNode::Void,
        K::NullType => TypeNode::Null,
        K::NoType => TypeNode::NoType,
        K::ErrorType => TypeNode::Error,
        K::ArrayType => TypeNode::Array {
            dims: nr.r.read_u32()?,
            component: nr.edge()?,
        },
        K::ClassType => TypeNode::Class {
            owner: nr.edge()?,
            refers_to: nr.edge()?,
        },
        K::ParameterizedType => TypeNode::Parameterized {
            owner: nr.edge()?,
            raw: nr.edge()?,
            arguments: nr.edges()?,
        },
        K::PackageType => TypeNode::Package {
            refers_to: nr.edge()?,
        },
        K::MethodType => TypeNode::Method {
            return_type: nr.edge()?,
            parameter_types: nr.edges()?,
            thrown_types: nr.edges()?,
        },
        K::TypeVariable => TypeNode::Variable {
            refers_to: nr.edge()?,
        },
        K::UnionType => TypeNode::Union {
            alternatives: nr.edges()?,
        },
        _ => TypeNode::Wildcard {
            bound_kind: decode_bound(nr.r.read_u8()?)?,
            bound: nr.edge()?,
        },
    })
}

fn read_literal<R: Read>(nr: &mut NodeReader<'_, R>) -> Result<LiteralValue> {
    Ok(match nr.r.read_u8()? {
        0 => LiteralValue::Boolean(nr.r.read_u8()? != 0),
        1 => {
            let raw = nr.r.read_u32()?;
            LiteralValue::Character(
                char::from_u32(raw)
                    .ok_or_else(|| GraphError::Format(format!("invalid char literal {raw}")))?,
            )
        }
        2 => LiteralValue::Integer(nr.r.read_u64()? as i64),
        3 => LiteralValue::Floating(f64::from_bits(nr.r.read_u64()?)),
        4 => LiteralValue::Str(nr.string()?),
        5 => LiteralValue::Null,
        other => {
            return Err(GraphError::Format(format!(
                "invalid literal discriminant {other}"
            )))
        }
    })
}

fn decode_modifiers(bits: u8) -> Result<Modifiers> {
    Ok(Modifiers {
        visibility: match bits & 0b11 {
            0 => Visibility::PackagePrivate,
            1 => Visibility::Public,
            2 => Visibility::Protected,
            _ => Visibility::Private,
        },
        is_static: bits & 0b100 != 0,
        is_final: bits & 0b1000 != 0,
        is_abstract: bits & 0b1_0000 != 0,
    })
}

fn decode_primitive(tag: u8) -> Result<PrimitiveKind> {
    use PrimitiveKind::*;
    Ok(match tag {
        0 => Boolean,
        1 => Byte,
        2 => Short,
        3 => Int,
        4 => Long,
        5 => Char,
        6 => Float,
        7 => Double,
        other => {
            return Err(GraphError::Format(format!(
                "invalid primitive kind {other}"
            )))
        }
    })
}

fn decode_bound(tag: u8) -> Result<WildcardBound> {
    Ok(match tag {
        0 => WildcardBound::Unbounded,
        1 => WildcardBound::Extends,
        2 => WildcardBound::Super,
        other => {
            return Err(GraphError::Format(format!(
                "invalid wildcard bound {other}"
            )))
        }
    })
}

fn decode_assign_op(tag: u8) -> Result<AssignOperator> {
    use AssignOperator::*;
    Ok(match tag {
        0 => Assign,
        1 => Plus,
        2 => Minus,
        3 => Times,
        4 => Divide,
        5 => Remainder,
        6 => LeftShift,
        7 => SignedRightShift,
        8 => UnsignedRightShift,
        9 => And,
        10 => Or,
        11 => Xor,
        other => {
            return Err(GraphError::Format(format!(
                "invalid assignment operator {other}"
            )))
        }
    })
}

fn decode_infix_op(tag: u8) -> Result<InfixOperator> {
    use InfixOperator::*;
    Ok(match tag {
        0 => Plus,
        1 => Minus,
        2 => Times,
        3 => Divide,
        4 => Remainder,
        5 => LeftShift,
        6 => SignedRightShift,
        7 => UnsignedRightShift,
        8 => LessThan,
        9 => GreaterThan,
        10 => LessThanOrEqual,
        11 => GreaterThanOrEqual,
        12 => Equal,
        13 => NotEqual,
        14 => BitwiseAnd,
        15 => BitwiseOr,
        16 => BitwiseXor,
        17 => ConditionalAnd,
        18 => ConditionalOr,
        other => {
            return Err(GraphError::Format(format!(
                "invalid infix operator {other}"
            )))
        }
    })
}

fn decode_prefix_op(tag: u8) -> Result<PrefixOperator> {
    use PrefixOperator::*;
    Ok(match tag {
        0 => Increment,
        1 => Decrement,
        2 => Plus,
        3 => Minus,
        4 => Complement,
        5 => Not,
        other => {
            return Err(GraphError::Format(format!(
                "invalid prefix operator {other}"
            )))
        }
    })
}
