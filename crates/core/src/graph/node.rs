//! Node payloads.
//!
//! One tagged union per the schema instead of a class hierarchy: shared state
//! (parent, span, comments, generated flags) lives on [`Node`], kind-specific
//! edges and scalars live in [`NodeData`]. Edges are plain [`NodeId`]s into
//! the arena; `NodeId::NONE` (= 0) means "not set".

use crate::graph::kind::NodeKind;
use crate::graph::range::Range;
use crate::storage::strtable::StrKey;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn is_some(self) -> bool {
        self.0 != 0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    PackagePrivate,
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeShape {
    Class,
    Interface,
    Enum,
    Annotation,
    Anonymous,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    #[default]
    Normal,
    Constructor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarShape {
    Field,
    Parameter,
    EnumConstant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentStyle {
    Line,
    Block,
    Doc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardBound {
    Unbounded,
    Extends,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOperator {
    Assign,
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
    LeftShift,
    SignedRightShift,
    UnsignedRightShift,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOperator {
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
    LeftShift,
    SignedRightShift,
    UnsignedRightShift,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ConditionalAnd,
    ConditionalOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOperator {
    Increment,
    Decrement,
    Plus,
    Minus,
    Complement,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRefMode {
    Invoke,
    New,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Boolean(bool),
    Character(char),
    Integer(i64),
    Floating(f64),
    Str(SmolStr),
    Null,
}

/// A graph node: shared state plus the kind-specific payload.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: NodeId,
    pub span: Option<Range>,
    pub comments: Vec<NodeId>,
    pub compiler_generated: bool,
    pub tool_generated: bool,
    pub data: NodeData,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            span: None,
            comments: Vec::new(),
            compiler_generated: false,
            tool_generated: false,
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Comment {
        style: CommentStyle,
        text: StrKey,
    },
    Package(PackageNode),
    CompilationUnit(CompilationUnitNode),
    PackageDeclaration {
        /// Owned name expression of the declaration.
        package_name: NodeId,
        /// The package node this declaration refers to.
        refers_to: NodeId,
    },
    Import {
        is_static: bool,
        target: NodeId,
    },
    Decl(DeclNode),
    InitializerBlock {
        is_static: bool,
        body: NodeId,
        lloc: u32,
    },
    Stmt(StmtNode),
    Expr(ExprNode),
    Type(TypeNode),
}

#[derive(Debug, Clone)]
pub struct PackageNode {
    pub name: SmolStr,
    pub qualified_name: SmolStr,
    pub annotations: Vec<NodeId>,
    pub members: Vec<NodeId>,
    pub compilation_units: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct CompilationUnitNode {
    pub package_declaration: NodeId,
    pub imports: Vec<NodeId>,
    pub others: Vec<NodeId>,
    /// Association (not ownership): the type declarations lexically inside
    /// this unit. Ownership runs through the package hierarchy.
    pub type_declarations: Vec<NodeId>,
    pub lloc: u32,
}

/// A named declaration: the shared name/modifier/annotation state plus the
/// declaration-specific payload.
#[derive(Debug, Clone)]
pub struct DeclNode {
    pub name: SmolStr,
    pub name_span: Option<Range>,
    pub modifiers: Modifiers,
    pub annotations: Vec<NodeId>,
    pub data: DeclData,
}

#[derive(Debug, Clone)]
pub enum DeclData {
    Type(TypeDeclData),
    Method(MethodData),
    AnnotationElement {
        return_type: NodeId,
        default_value: NodeId,
        /// Back-filled by the type graph builder.
        method_type: NodeId,
    },
    Variable(VariableData),
    TypeParameter {
        bounds: Vec<NodeId>,
    },
}

#[derive(Debug, Clone)]
pub struct TypeDeclData {
    pub shape: TypeShape,
    pub is_generic: bool,
    pub binary_name: SmolStr,
    pub type_parameters: Vec<NodeId>,
    pub superclass: NodeId,
    pub super_interfaces: Vec<NodeId>,
    pub members: Vec<NodeId>,
    pub others: Vec<NodeId>,
    /// Association back to the unit the declaration appears in; `NONE` for
    /// declarations materialized from outside the analyzed set.
    pub in_compilation_unit: NodeId,
    pub lloc: u32,
}

#[derive(Debug, Clone)]
pub struct MethodData {
    pub is_generic: bool,
    pub method_kind: MethodKind,
    pub type_parameters: Vec<NodeId>,
    pub parameters: Vec<NodeId>,
    pub return_type: NodeId,
    pub thrown_exceptions: Vec<NodeId>,
    pub body: NodeId,
    /// Back-filled by the type graph builder.
    pub method_type: NodeId,
    /// Nearest override-compatible ancestor method, when materialized.
    pub overrides: NodeId,
    pub lloc: u32,
}

#[derive(Debug, Clone)]
pub struct VariableData {
    pub shape: VarShape,
    pub var_type: NodeId,
    /// Initial-value expression for fields, the construction expression for
    /// enum constants, `NONE` for parameters.
    pub init: NodeId,
}

/// Expression node: the back-filled type edge plus the expression payload.
/// Type expressions are expressions too and live in the same union.
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub ty: NodeId,
    pub data: ExprData,
}

#[derive(Debug, Clone)]
pub enum ExprData {
    ArrayAccess {
        array: NodeId,
        index: NodeId,
    },
    Assignment {
        operator: AssignOperator,
        left: NodeId,
        right: NodeId,
    },
    ClassLiteral {
        component: NodeId,
    },
    Conditional {
        condition: NodeId,
        true_expr: NodeId,
        false_expr: NodeId,
    },
    Erroneous {
        errors: Vec<NodeId>,
    },
    FieldAccess {
        left: NodeId,
        right: NodeId,
    },
    Identifier {
        name: SmolStr,
        /// Resolved declaration; back-filled by the cross-edge resolver.
        refers_to: NodeId,
    },
    Infix {
        operator: InfixOperator,
        left: NodeId,
        right: NodeId,
    },
    InstanceOf {
        operand: NodeId,
        type_operand: NodeId,
    },
    Lambda {
        parameters: Vec<NodeId>,
        body: NodeId,
        lloc: u32,
    },
    Literal {
        value: LiteralValue,
        /// Source text of the literal as written.
        text: SmolStr,
    },
    MarkerAnnotation {
        annotation_name: NodeId,
    },
    MemberReference {
        mode: MemberRefMode,
        qualifier: NodeId,
        name: SmolStr,
        type_arguments: Vec<NodeId>,
        /// Resolved member; back-filled by the cross-edge resolver.
        refers_to: NodeId,
    },
    MethodInvocation {
        operand: NodeId,
        type_arguments: Vec<NodeId>,
        arguments: Vec<NodeId>,
        /// Resolved method declaration; back-filled by the resolver.
        invokes: NodeId,
    },
    NewArray {
        component_type: NodeId,
        dimensions: Vec<NodeId>,
        initializers: Vec<NodeId>,
    },
    NewClass {
        enclosing: NodeId,
        type_name: NodeId,
        type_arguments: Vec<NodeId>,
        arguments: Vec<NodeId>,
        anonymous_class: NodeId,
        /// Resolved constructor declaration; back-filled by the resolver.
        constructor: NodeId,
    },
    NormalAnnotation {
        annotation_name: NodeId,
        arguments: Vec<NodeId>,
    },
    Paren {
        operand: NodeId,
    },
    Postfix {
        operator: PostfixOperator,
        operand: NodeId,
    },
    Prefix {
        operator: PrefixOperator,
        operand: NodeId,
    },
    SingleElementAnnotation {
        annotation_name: NodeId,
        argument: NodeId,
    },
    Super,
    This,
    TypeCast {
        type_operand: NodeId,
        operand: NodeId,
    },
    // ---- type expressions ----
    ArrayTypeExpr {
        component: NodeId,
    },
    ErroneousTypeExpr {
        errors: Vec<NodeId>,
    },
    /// Stand-in type expression for declarations materialized from symbol
    /// information only; the type edge is the sole payload.
    ExternalTypeExpr,
    PrimitiveTypeExpr {
        kind: PrimitiveKind,
    },
    QualifiedTypeExpr {
        qualifier: NodeId,
        simple: NodeId,
    },
    SimpleTypeExpr {
        name: SmolStr,
    },
    TypeApplyExpr {
        raw: NodeId,
        type_arguments: Vec<NodeId>,
    },
    TypeUnionExpr {
        alternatives: Vec<NodeId>,
    },
    WildcardExpr {
        bound_kind: WildcardBound,
        bound: NodeId,
    },
}

#[derive(Debug, Clone)]
pub enum StmtNode {
    Assert {
        condition: NodeId,
        detail: NodeId,
    },
    BasicFor {
        initializers: Vec<NodeId>,
        condition: NodeId,
        updates: Vec<NodeId>,
        body: NodeId,
        /// Positions of the two separators inside the three-part header.
        first_semi: Option<Range>,
        second_semi: Option<Range>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    Break {
        label: Option<SmolStr>,
        label_span: Option<Range>,
        /// Resolved jump target; back-filled by the resolver.
        target: NodeId,
    },
    Case {
        expression: NodeId,
        statements: Vec<NodeId>,
    },
    Continue {
        label: Option<SmolStr>,
        label_span: Option<Range>,
        target: NodeId,
    },
    Default {
        statements: Vec<NodeId>,
    },
    Do {
        condition: NodeId,
        body: NodeId,
    },
    Empty,
    EnhancedFor {
        parameter: NodeId,
        expression: NodeId,
        body: NodeId,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    Handler {
        parameter: NodeId,
        block: NodeId,
    },
    If {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    LabeledStatement {
        label: SmolStr,
        statement: NodeId,
    },
    Return {
        expression: NodeId,
    },
    Switch {
        condition: NodeId,
        cases: Vec<NodeId>,
    },
    Synchronized {
        lock: NodeId,
        block: NodeId,
    },
    Throw {
        expression: NodeId,
    },
    Try {
        resources: Vec<NodeId>,
        block: NodeId,
        handlers: Vec<NodeId>,
        finally_block: NodeId,
    },
    While {
        condition: NodeId,
        body: NodeId,
    },
}

/// Canonical (flyweight) type nodes. These live outside the ownership tree
/// and are only ever reached through type edges.
#[derive(Debug, Clone)]
pub enum TypeNode {
    Primitive(PrimitiveKind),
    Void,
    Null,
    NoType,
    Error,
    Array {
        dims: u32,
        component: NodeId,
    },
    Class {
        owner: NodeId,
        refers_to: NodeId,
    },
    Parameterized {
        owner: NodeId,
        raw: NodeId,
        arguments: Vec<NodeId>,
    },
    Package {
        refers_to: NodeId,
    },
    Method {
        return_type: NodeId,
        parameter_types: Vec<NodeId>,
        thrown_types: Vec<NodeId>,
    },
    Variable {
        refers_to: NodeId,
    },
    Union {
        alternatives: Vec<NodeId>,
    },
    Wildcard {
        bound_kind: WildcardBound,
        bound: NodeId,
    },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Comment { style, .. } => match style {
                CommentStyle::Line => NodeKind::LineComment,
                CommentStyle::Block => NodeKind::BlockComment,
                CommentStyle::Doc => NodeKind::DocComment,
            },
            NodeData::Package(_) => NodeKind::Package,
            NodeData::CompilationUnit(_) => NodeKind::CompilationUnit,
            NodeData::PackageDeclaration { .. } => NodeKind::PackageDeclaration,
            NodeData::Import { .. } => NodeKind::Import,
            NodeData::Decl(decl) => decl.kind(),
            NodeData::InitializerBlock { is_static, .. } => {
                if *is_static {
                    NodeKind::StaticInitializer
                } else {
                    NodeKind::InstanceInitializer
                }
            }
            NodeData::Stmt(stmt) => stmt.kind(),
            NodeData::Expr(expr) => expr.data.kind(),
            NodeData::Type(ty) => ty.kind(),
        }
    }

    /// Appends the structurally owned children of this node, in order.
    pub fn owned_children(&self, out: &mut Vec<NodeId>) {
        fn push(out: &mut Vec<NodeId>, id: NodeId) {
            if id.is_some() {
                out.push(id);
            }
        }
        fn push_all(out: &mut Vec<NodeId>, ids: &[NodeId]) {
            out.extend(ids.iter().copied().filter(|id| id.is_some()));
        }

        match self {
            NodeData::Comment { .. } | NodeData::Type(_) => {}
            NodeData::Package(pkg) => {
                push_all(out, &pkg.annotations);
                push_all(out, &pkg.compilation_units);
                push_all(out, &pkg.members);
            }
            NodeData::CompilationUnit(cu) => {
                push(out, cu.package_declaration);
                push_all(out, &cu.imports);
                push_all(out, &cu.others);
            }
            NodeData::PackageDeclaration { package_name, .. } => push(out, *package_name),
            NodeData::Import { target, .. } => push(out, *target),
            NodeData::Decl(decl) => {
                push_all(out, &decl.annotations);
                match &decl.data {
                    DeclData::Type(t) => {
                        push_all(out, &t.type_parameters);
                        push(out, t.superclass);
                        push_all(out, &t.super_interfaces);
                        push_all(out, &t.members);
                        push_all(out, &t.others);
                    }
                    DeclData::Method(m) => {
                        push_all(out, &m.type_parameters);
                        push(out, m.return_type);
                        push_all(out, &m.parameters);
                        push_all(out, &m.thrown_exceptions);
                        push(out, m.body);
                    }
                    DeclData::AnnotationElement {
                        return_type,
                        default_value,
                        ..
                    } => {
                        push(out, *return_type);
                        push(out, *default_value);
                    }
                    DeclData::Variable(v) => {
                        push(out, v.var_type);
                        push(out, v.init);
                    }
                    DeclData::TypeParameter { bounds } => push_all(out, bounds),
                }
            }
            NodeData::InitializerBlock { body, .. } => push(out, *body),
            NodeData::Stmt(stmt) => stmt.owned_children(out),
            NodeData::Expr(expr) => expr.data.owned_children(out),
        }
    }

    /// Appends the non-owning edges of this node: resolved cross references
    /// and type edges. Used by the reachability pass.
    pub fn reference_edges(&self, out: &mut Vec<NodeId>) {
        fn push(out: &mut Vec<NodeId>, id: NodeId) {
            if id.is_some() {
                out.push(id);
            }
        }

        match self {
            NodeData::PackageDeclaration { refers_to, .. } => push(out, *refers_to),
            NodeData::CompilationUnit(cu) => {
                out.extend(cu.type_declarations.iter().copied().filter(|id| id.is_some()))
            }
            NodeData::Decl(decl) => match &decl.data {
                DeclData::Method(m) => {
                    push(out, m.method_type);
                    push(out, m.overrides);
                }
                DeclData::AnnotationElement { method_type, .. } => push(out, *method_type),
                _ => {}
            },
            NodeData::Expr(expr) => {
                push(out, expr.ty);
                match &expr.data {
                    ExprData::Identifier { refers_to, .. }
                    | ExprData::MemberReference { refers_to, .. } => push(out, *refers_to),
                    ExprData::MethodInvocation { invokes, .. } => push(out, *invokes),
                    ExprData::NewClass { constructor, .. } => push(out, *constructor),
                    _ => {}
                }
            }
            NodeData::Stmt(StmtNode::Break { target, .. })
            | NodeData::Stmt(StmtNode::Continue { target, .. }) => push(out, *target),
            NodeData::Type(ty) => match ty {
                TypeNode::Array { component, .. } => push(out, *component),
                TypeNode::Class { owner, refers_to } => {
                    push(out, *owner);
                    push(out, *refers_to);
                }
                TypeNode::Parameterized {
                    owner,
                    raw,
                    arguments,
                } => {
                    push(out, *owner);
                    push(out, *raw);
                    out.extend(arguments.iter().copied().filter(|id| id.is_some()));
                }
                TypeNode::Package { refers_to } | TypeNode::Variable { refers_to } => {
                    push(out, *refers_to)
                }
                TypeNode::Method {
                    return_type,
                    parameter_types,
                    thrown_types,
                } => {
                    push(out, *return_type);
                    out.extend(parameter_types.iter().copied().filter(|id| id.is_some()));
                    out.extend(thrown_types.iter().copied().filter(|id| id.is_some()));
                }
                TypeNode::Union { alternatives } => {
                    out.extend(alternatives.iter().copied().filter(|id| id.is_some()))
                }
                TypeNode::Wildcard { bound, .. } => push(out, *bound),
                _ => {}
            },
            _ => {}
        }
    }
}

impl DeclNode {
    pub fn kind(&self) -> NodeKind {
        match &self.data {
            DeclData::Type(t) => match (t.shape, t.is_generic) {
                (TypeShape::Class, false) => NodeKind::Class,
                (TypeShape::Class, true) => NodeKind::ClassGeneric,
                (TypeShape::Interface, false) => NodeKind::Interface,
                (TypeShape::Interface, true) => NodeKind::InterfaceGeneric,
                (TypeShape::Enum, _) => NodeKind::Enum,
                (TypeShape::Annotation, _) => NodeKind::AnnotationType,
                (TypeShape::Anonymous, _) => NodeKind::AnonymousClass,
            },
            DeclData::Method(m) => {
                if m.is_generic {
                    NodeKind::MethodGeneric
                } else {
                    NodeKind::Method
                }
            }
            DeclData::AnnotationElement { .. } => NodeKind::AnnotationTypeElement,
            DeclData::Variable(v) => match v.shape {
                VarShape::Field => NodeKind::Variable,
                VarShape::Parameter => NodeKind::Parameter,
                VarShape::EnumConstant => NodeKind::EnumConstant,
            },
            DeclData::TypeParameter { .. } => NodeKind::TypeParameter,
        }
    }
}

impl StmtNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            StmtNode::Assert { .. } => NodeKind::Assert,
            StmtNode::BasicFor { .. } => NodeKind::BasicFor,
            StmtNode::Block { .. } => NodeKind::Block,
            StmtNode::Break { .. } => NodeKind::Break,
            StmtNode::Case { .. } => NodeKind::Case,
            StmtNode::Continue { .. } => NodeKind::Continue,
            StmtNode::Default { .. } => NodeKind::Default,
            StmtNode::Do { .. } => NodeKind::Do,
            StmtNode::Empty => NodeKind::Empty,
            StmtNode::EnhancedFor { .. } => NodeKind::EnhancedFor,
            StmtNode::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            StmtNode::Handler { .. } => NodeKind::Handler,
            StmtNode::If { .. } => NodeKind::If,
            StmtNode::LabeledStatement { .. } => NodeKind::LabeledStatement,
            StmtNode::Return { .. } => NodeKind::Return,
            StmtNode::Switch { .. } => NodeKind::Switch,
            StmtNode::Synchronized { .. } => NodeKind::Synchronized,
            StmtNode::Throw { .. } => NodeKind::Throw,
            StmtNode::Try { .. } => NodeKind::Try,
            StmtNode::While { .. } => NodeKind::While,
        }
    }

    fn owned_children(&self, out: &mut Vec<NodeId>) {
        fn push(out: &mut Vec<NodeId>, id: NodeId) {
            if id.is_some() {
                out.push(id);
            }
        }
        fn push_all(out: &mut Vec<NodeId>, ids: &[NodeId]) {
            out.extend(ids.iter().copied().filter(|id| id.is_some()));
        }

        match self {
            StmtNode::Assert { condition, detail } => {
                push(out, *condition);
                push(out, *detail);
            }
            StmtNode::BasicFor {
                initializers,
                condition,
                updates,
                body,
                ..
            } => {
                push_all(out, initializers);
                push(out, *condition);
                push_all(out, updates);
                push(out, *body);
            }
            StmtNode::Block { statements }
            | StmtNode::Default { statements } => push_all(out, statements),
            StmtNode::Break { .. } | StmtNode::Continue { .. } | StmtNode::Empty => {}
            StmtNode::Case {
                expression,
                statements,
            } => {
                push(out, *expression);
                push_all(out, statements);
            }
            StmtNode::Do { condition, body } => {
                push(out, *condition);
                push(out, *body);
            }
            StmtNode::EnhancedFor {
                parameter,
                expression,
                body,
            } => {
                push(out, *parameter);
                push(out, *expression);
                push(out, *body);
            }
            StmtNode::ExpressionStatement { expression } => push(out, *expression),
            StmtNode::Handler { parameter, block } => {
                push(out, *parameter);
                push(out, *block);
            }
            StmtNode::If {
                condition,
                then_branch,
                else_branch,
            } => {
                push(out, *condition);
                push(out, *then_branch);
                push(out, *else_branch);
            }
            StmtNode::LabeledStatement { statement, .. } => push(out, *statement),
            StmtNode::Return { expression } => push(out, *expression),
            StmtNode::Switch { condition, cases } => {
                push(out, *condition);
                push_all(out, cases);
            }
            StmtNode::Synchronized { lock, block } => {
                push(out, *lock);
                push(out, *block);
            }
            StmtNode::Throw { expression } => push(out, *expression),
            StmtNode::Try {
                resources,
                block,
                handlers,
                finally_block,
            } => {
                push_all(out, resources);
                push(out, *block);
                push_all(out, handlers);
                push(out, *finally_block);
            }
            StmtNode::While { condition, body } => {
                push(out, *condition);
                push(out, *body);
            }
        }
    }
}

impl ExprData {
    pub fn kind(&self) -> NodeKind {
        match self {
            ExprData::ArrayAccess { .. } => NodeKind::ArrayAccess,
            ExprData::Assignment { .. } => NodeKind::Assignment,
            ExprData::ClassLiteral { .. } => NodeKind::ClassLiteral,
            ExprData::Conditional { .. } => NodeKind::Conditional,
            ExprData::Erroneous { .. } => NodeKind::Erroneous,
            ExprData::FieldAccess { .. } => NodeKind::FieldAccess,
            ExprData::Identifier { .. } => NodeKind::Identifier,
            ExprData::Infix { .. } => NodeKind::InfixExpression,
            ExprData::InstanceOf { .. } => NodeKind::InstanceOf,
            ExprData::Lambda { .. } => NodeKind::Lambda,
            ExprData::Literal { .. } => NodeKind::Literal,
            ExprData::MarkerAnnotation { .. } => NodeKind::MarkerAnnotation,
            ExprData::MemberReference { .. } => NodeKind::MemberReference,
            ExprData::MethodInvocation { .. } => NodeKind::MethodInvocation,
            ExprData::NewArray { .. } => NodeKind::NewArray,
            ExprData::NewClass { .. } => NodeKind::NewClass,
            ExprData::NormalAnnotation { .. } => NodeKind::NormalAnnotation,
            ExprData::Paren { .. } => NodeKind::ParenthesizedExpression,
            ExprData::Postfix { .. } => NodeKind::PostfixExpression,
            ExprData::Prefix { .. } => NodeKind::PrefixExpression,
            ExprData::SingleElementAnnotation { .. } => NodeKind::SingleElementAnnotation,
            ExprData::Super => NodeKind::Super,
            ExprData::This => NodeKind::This,
            ExprData::TypeCast { .. } => NodeKind::TypeCast,
            ExprData::ArrayTypeExpr { .. } => NodeKind::ArrayTypeExpression,
            ExprData::ErroneousTypeExpr { .. } => NodeKind::ErroneousTypeExpression,
            ExprData::ExternalTypeExpr => NodeKind::ExternalTypeExpression,
            ExprData::PrimitiveTypeExpr { .. } => NodeKind::PrimitiveTypeExpression,
            ExprData::QualifiedTypeExpr { .. } => NodeKind::QualifiedTypeExpression,
            ExprData::SimpleTypeExpr { .. } => NodeKind::SimpleTypeExpression,
            ExprData::TypeApplyExpr { .. } => NodeKind::TypeApplyExpression,
            ExprData::TypeUnionExpr { .. } => NodeKind::TypeUnionExpression,
            ExprData::WildcardExpr { .. } => NodeKind::WildcardExpression,
        }
    }

    fn owned_children(&self, out: &mut Vec<NodeId>) {
        fn push(out: &mut Vec<NodeId>, id: NodeId) {
            if id.is_some() {
                out.push(id);
            }
        }
        fn push_all(out: &mut Vec<NodeId>, ids: &[NodeId]) {
            out.extend(ids.iter().copied().filter(|id| id.is_some()));
        }

        match self {
            ExprData::ArrayAccess { array, index } => {
                push(out, *array);
                push(out, *index);
            }
            ExprData::Assignment { left, right, .. }
            | ExprData::Infix { left, right, .. }
            | ExprData::FieldAccess { left, right } => {
                push(out, *left);
                push(out, *right);
            }
            ExprData::ClassLiteral { component } => push(out, *component),
            ExprData::Conditional {
                condition,
                true_expr,
                false_expr,
            } => {
                push(out, *condition);
                push(out, *true_expr);
                push(out, *false_expr);
            }
            ExprData::Erroneous { errors } | ExprData::ErroneousTypeExpr { errors } => {
                push_all(out, errors)
            }
            ExprData::Identifier { .. }
            | ExprData::Literal { .. }
            | ExprData::Super
            | ExprData::This
            | ExprData::ExternalTypeExpr
            | ExprData::PrimitiveTypeExpr { .. }
            | ExprData::SimpleTypeExpr { .. } => {}
            ExprData::InstanceOf {
                operand,
                type_operand,
            } => {
                push(out, *operand);
                push(out, *type_operand);
            }
            ExprData::Lambda {
                parameters, body, ..
            } => {
                push_all(out, parameters);
                push(out, *body);
            }
            ExprData::MarkerAnnotation { annotation_name } => push(out, *annotation_name),
            ExprData::MemberReference {
                qualifier,
                type_arguments,
                ..
            } => {
                push(out, *qualifier);
                push_all(out, type_arguments);
            }
            ExprData::MethodInvocation {
                operand,
                type_arguments,
                arguments,
                ..
            } => {
                push_all(out, arguments);
                push_all(out, type_arguments);
                push(out, *operand);
            }
            ExprData::NewArray {
                component_type,
                dimensions,
                initializers,
            } => {
                push(out, *component_type);
                push_all(out, dimensions);
                push_all(out, initializers);
            }
            ExprData::NewClass {
                enclosing,
                type_name,
                type_arguments,
                arguments,
                anonymous_class,
                ..
            } => {
                push(out, *enclosing);
                push(out, *type_name);
                push_all(out, type_arguments);
                push_all(out, arguments);
                push(out, *anonymous_class);
            }
            ExprData::NormalAnnotation {
                annotation_name,
                arguments,
            } => {
                push(out, *annotation_name);
                push_all(out, arguments);
            }
            ExprData::Paren { operand }
            | ExprData::Postfix { operand, .. }
            | ExprData::Prefix { operand, .. } => push(out, *operand),
            ExprData::SingleElementAnnotation {
                annotation_name,
                argument,
            } => {
                push(out, *annotation_name);
                push(out, *argument);
            }
            ExprData::TypeCast {
                type_operand,
                operand,
            } => {
                push(out, *operand);
                push(out, *type_operand);
            }
            ExprData::ArrayTypeExpr { component } => push(out, *component),
            ExprData::QualifiedTypeExpr { qualifier, simple } => {
                push(out, *qualifier);
                push(out, *simple);
            }
            ExprData::TypeApplyExpr {
                raw,
                type_arguments,
            } => {
                push(out, *raw);
                push_all(out, type_arguments);
            }
            ExprData::TypeUnionExpr { alternatives } => push_all(out, alternatives),
            ExprData::WildcardExpr { bound, .. } => push(out, *bound),
        }
    }
}

impl TypeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            TypeNode::Primitive(_) => NodeKind::PrimitiveType,
            TypeNode::Void => NodeKind::VoidType,
            TypeNode::Null => NodeKind::NullType,
            TypeNode::NoType => NodeKind::NoType,
            TypeNode::Error => NodeKind::ErrorType,
            TypeNode::Array { .. } => NodeKind::ArrayType,
            TypeNode::Class { .. } => NodeKind::ClassType,
            TypeNode::Parameterized { .. } => NodeKind::ParameterizedType,
            TypeNode::Package { .. } => NodeKind::PackageType,
            TypeNode::Method { .. } => NodeKind::MethodType,
            TypeNode::Variable { .. } => NodeKind::TypeVariable,
            TypeNode::Union { .. } => NodeKind::UnionType,
            TypeNode::Wildcard { .. } => NodeKind::WildcardType,
        }
    }
}
