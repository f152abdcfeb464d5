//! The oracle's syntax tree, one struct/enum per construct.
//!
//! Spans come in pairs: the narrow span covers the exact token extent, the
//! wide span includes immediately adjacent trivia (modifiers, annotations).
//! Symbol/type references were resolved upstream and appear as opaque ids.

use super::{SymbolId, TypeId};
use semgraph_core::graph::{
    AssignOperator, InfixOperator, Modifiers, PostfixOperator, PrefixOperator, PrimitiveKind,
    WildcardBound,
};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstSpan {
    pub line: u32,
    pub col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl AstSpan {
    pub fn new(line: u32, col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            line,
            col,
            end_line,
            end_col,
        }
    }

    pub fn is_set(&self) -> bool {
        self.line != 0
    }
}

/// Narrow and wide extent of one construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstPos {
    pub narrow: AstSpan,
    #[serde(default)]
    pub wide: AstSpan,
}

impl AstPos {
    pub fn new(narrow: AstSpan, wide: AstSpan) -> Self {
        Self { narrow, wide }
    }

    /// Position without separate trivia extent: wide equals narrow.
    pub fn tight(span: AstSpan) -> Self {
        Self {
            narrow: span,
            wide: span,
        }
    }

    pub fn wide_or_narrow(&self) -> AstSpan {
        if self.wide.is_set() {
            self.wide
        } else {
            self.narrow
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AstItem {
    Import(AstImport),
    Type(AstTypeDecl),
    Empty { pos: AstPos },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstImport {
    pub is_static: bool,
    pub target: AstExpr,
    pub pos: AstPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AstTypeShape {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstTypeDecl {
    pub shape: AstTypeShape,
    pub name: SmolStr,
    pub symbol: SymbolId,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<AstAnnotation>,
    #[serde(default)]
    pub type_params: Vec<AstTypeParam>,
    #[serde(default)]
    pub superclass: Option<AstTypeExpr>,
    /// Supertype present in the semantic model but absent in source (implicit
    /// `Object`, the enum base class). Projected as a synthesized simple type
    /// expression.
    #[serde(default)]
    pub implicit_superclass: TypeId,
    #[serde(default)]
    pub interfaces: Vec<AstTypeExpr>,
    #[serde(default)]
    pub members: Vec<AstMember>,
    pub pos: AstPos,
    #[serde(default)]
    pub name_span: Option<AstSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstTypeParam {
    pub name: SmolStr,
    /// The type-variable type this parameter declares.
    pub ty: TypeId,
    #[serde(default)]
    pub bounds: Vec<AstTypeExpr>,
    pub pos: AstPos,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AstMember {
    Field(AstVarDecl),
    EnumConstant(AstVarDecl),
    Method(AstMethodDecl),
    Type(AstTypeDecl),
    Initializer {
        is_static: bool,
        body: AstStmt,
        pos: AstPos,
    },
    Empty { pos: AstPos },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstMethodDecl {
    pub name: SmolStr,
    pub symbol: SymbolId,
    #[serde(default)]
    pub is_constructor: bool,
    /// Generated member (default constructor, anonymous-class constructor);
    /// the whole subtree is flagged and carries no positions.
    #[serde(default)]
    pub is_generated: bool,
    /// Element of an annotation type rather than an ordinary method.
    #[serde(default)]
    pub is_annotation_element: bool,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<AstAnnotation>,
    #[serde(default)]
    pub type_params: Vec<AstTypeParam>,
    #[serde(default)]
    pub params: Vec<AstVarDecl>,
    #[serde(default)]
    pub return_type: Option<AstTypeExpr>,
    #[serde(default)]
    pub thrown: Vec<AstTypeExpr>,
    #[serde(default)]
    pub body: Option<AstStmt>,
    #[serde(default)]
    pub default_value: Option<AstExpr>,
    pub pos: AstPos,
    #[serde(default)]
    pub name_span: Option<AstSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstVarDecl {
    pub name: SmolStr,
    pub symbol: SymbolId,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<AstAnnotation>,
    #[serde(default)]
    pub var_type: Option<AstTypeExpr>,
    #[serde(default)]
    pub init: Option<AstExpr>,
    pub pos: AstPos,
    #[serde(default)]
    pub name_span: Option<AstSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstAnnotation {
    pub name: AstTypeExpr,
    #[serde(default)]
    pub args: Vec<AstExpr>,
    #[serde(default)]
    pub ty: TypeId,
    pub pos: AstPos,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AstStmt {
    Assert {
        condition: Box<AstExpr>,
        #[serde(default)]
        detail: Option<Box<AstExpr>>,
        pos: AstPos,
    },
    BasicFor {
        #[serde(default)]
        init: Vec<AstStmt>,
        #[serde(default)]
        condition: Option<Box<AstExpr>>,
        #[serde(default)]
        update: Vec<AstStmt>,
        body: Box<AstStmt>,
        /// The two separator positions inside the three-part header.
        #[serde(default)]
        semi_spans: Option<(AstSpan, AstSpan)>,
        pos: AstPos,
    },
    Block {
        #[serde(default)]
        statements: Vec<AstStmt>,
        pos: AstPos,
    },
    Break {
        #[serde(default)]
        label: Option<SmolStr>,
        #[serde(default)]
        label_span: Option<AstSpan>,
        pos: AstPos,
    },
    Continue {
        #[serde(default)]
        label: Option<SmolStr>,
        #[serde(default)]
        label_span: Option<AstSpan>,
        pos: AstPos,
    },
    Do {
        condition: Box<AstExpr>,
        body: Box<AstStmt>,
        pos: AstPos,
    },
    Empty { pos: AstPos },
    EnhancedFor {
        param: Box<AstVarDecl>,
        expr: Box<AstExpr>,
        body: Box<AstStmt>,
        pos: AstPos,
    },
    Expression {
        expr: Box<AstExpr>,
        pos: AstPos,
    },
    If {
        condition: Box<AstExpr>,
        then_branch: Box<AstStmt>,
        #[serde(default)]
        else_branch: Option<Box<AstStmt>>,
        pos: AstPos,
    },
    Labeled {
        label: SmolStr,
        statement: Box<AstStmt>,
        pos: AstPos,
    },
    LocalType(AstTypeDecl),
    LocalVar(AstVarDecl),
    Return {
        #[serde(default)]
        expr: Option<Box<AstExpr>>,
        pos: AstPos,
    },
    Switch {
        selector: Box<AstExpr>,
        #[serde(default)]
        cases: Vec<AstCase>,
        pos: AstPos,
    },
    Synchronized {
        lock: Box<AstExpr>,
        block: Box<AstStmt>,
        pos: AstPos,
    },
    Throw {
        expr: Box<AstExpr>,
        pos: AstPos,
    },
    Try {
        #[serde(default)]
        resources: Vec<AstVarDecl>,
        block: Box<AstStmt>,
        #[serde(default)]
        catches: Vec<AstCatch>,
        #[serde(default)]
        finally: Option<Box<AstStmt>>,
        pos: AstPos,
    },
    While {
        condition: Box<AstExpr>,
        body: Box<AstStmt>,
        pos: AstPos,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstCase {
    /// `None` marks the `default` label.
    #[serde(default)]
    pub pattern: Option<AstExpr>,
    #[serde(default)]
    pub statements: Vec<AstStmt>,
    pub pos: AstPos,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstCatch {
    pub param: AstVarDecl,
    pub block: AstStmt,
    pub pos: AstPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AstLiteral {
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f64),
    Str,
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AstExpr {
    ArrayAccess {
        array: Box<AstExpr>,
        index: Box<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Assign {
        operator: AssignOperator,
        left: Box<AstExpr>,
        right: Box<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Annotation(Box<AstAnnotation>),
    ClassLiteral {
        component: Box<AstTypeExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Conditional {
        condition: Box<AstExpr>,
        true_expr: Box<AstExpr>,
        false_expr: Box<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Erroneous {
        #[serde(default)]
        errors: Vec<AstExpr>,
        pos: AstPos,
    },
    FieldAccess {
        object: Box<AstExpr>,
        /// The selected member: an identifier, `this` or `super`.
        member: Box<AstExpr>,
        /// Resolved member symbol, when the oracle bound one.
        #[serde(default)]
        symbol: SymbolId,
        ty: TypeId,
        pos: AstPos,
    },
    Identifier {
        name: SmolStr,
        #[serde(default)]
        symbol: SymbolId,
        ty: TypeId,
        pos: AstPos,
    },
    Infix {
        operator: InfixOperator,
        left: Box<AstExpr>,
        right: Box<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    InstanceOf {
        expr: Box<AstExpr>,
        test_type: Box<AstTypeExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Lambda {
        #[serde(default)]
        params: Vec<AstVarDecl>,
        body: Box<AstLambdaBody>,
        ty: TypeId,
        pos: AstPos,
    },
    Literal {
        value: AstLiteral,
        #[serde(default)]
        text: SmolStr,
        ty: TypeId,
        pos: AstPos,
    },
    MemberReference {
        mode: semgraph_core::graph::MemberRefMode,
        qualifier: Box<AstExpr>,
        name: SmolStr,
        #[serde(default)]
        type_args: Vec<AstTypeExpr>,
        #[serde(default)]
        symbol: SymbolId,
        ty: TypeId,
        pos: AstPos,
    },
    MethodInvocation {
        callee: Box<AstExpr>,
        #[serde(default)]
        type_args: Vec<AstTypeExpr>,
        #[serde(default)]
        args: Vec<AstExpr>,
        /// The invoked method symbol, as bound by the oracle.
        #[serde(default)]
        symbol: SymbolId,
        ty: TypeId,
        pos: AstPos,
    },
    NewArray {
        #[serde(default)]
        component: Option<Box<AstTypeExpr>>,
        #[serde(default)]
        dims: Vec<AstExpr>,
        #[serde(default)]
        init: Vec<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    NewClass {
        #[serde(default)]
        enclosing: Option<Box<AstExpr>>,
        type_name: Box<AstTypeExpr>,
        #[serde(default)]
        type_args: Vec<AstTypeExpr>,
        #[serde(default)]
        args: Vec<AstExpr>,
        #[serde(default)]
        anonymous_body: Option<Box<AstTypeDecl>>,
        #[serde(default)]
        constructor: SymbolId,
        ty: TypeId,
        pos: AstPos,
    },
    Paren {
        expr: Box<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Postfix {
        operator: PostfixOperator,
        operand: Box<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Prefix {
        operator: PrefixOperator,
        operand: Box<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Super {
        ty: TypeId,
        pos: AstPos,
    },
    This {
        ty: TypeId,
        pos: AstPos,
    },
    TypeCast {
        target: Box<AstTypeExpr>,
        expr: Box<AstExpr>,
        ty: TypeId,
        pos: AstPos,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AstLambdaBody {
    Expr(AstExpr),
    Block(AstStmt),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AstTypeExpr {
    Simple {
        name: SmolStr,
        #[serde(default)]
        symbol: SymbolId,
        ty: TypeId,
        pos: AstPos,
    },
    Qualified {
        qualifier: Box<AstTypeExpr>,
        name: SmolStr,
        #[serde(default)]
        symbol: SymbolId,
        ty: TypeId,
        pos: AstPos,
        #[serde(default)]
        name_span: Option<AstSpan>,
    },
    Primitive {
        kind: PrimitiveKind,
        ty: TypeId,
        pos: AstPos,
    },
    Array {
        component: Box<AstTypeExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Apply {
        raw: Box<AstTypeExpr>,
        #[serde(default)]
        args: Vec<AstTypeExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Union {
        #[serde(default)]
        alternatives: Vec<AstTypeExpr>,
        ty: TypeId,
        pos: AstPos,
    },
    Wildcard {
        bound_kind: WildcardBound,
        #[serde(default)]
        bound: Option<Box<AstTypeExpr>>,
        ty: TypeId,
        pos: AstPos,
    },
    Erroneous {
        pos: AstPos,
    },
}

impl AstExpr {
    pub fn pos(&self) -> AstPos {
        match self {
            AstExpr::ArrayAccess { pos, .. }
            | AstExpr::Assign { pos, .. }
            | AstExpr::ClassLiteral { pos, .. }
            | AstExpr::Conditional { pos, .. }
            | AstExpr::Erroneous { pos, .. }
            | AstExpr::FieldAccess { pos, .. }
            | AstExpr::Identifier { pos, .. }
            | AstExpr::Infix { pos, .. }
            | AstExpr::InstanceOf { pos, .. }
            | AstExpr::Lambda { pos, .. }
            | AstExpr::Literal { pos, .. }
            | AstExpr::MemberReference { pos, .. }
            | AstExpr::MethodInvocation { pos, .. }
            | AstExpr::NewArray { pos, .. }
            | AstExpr::NewClass { pos, .. }
            | AstExpr::Paren { pos, .. }
            | AstExpr::Postfix { pos, .. }
            | AstExpr::Prefix { pos, .. }
            | AstExpr::Super { pos, .. }
            | AstExpr::This { pos, .. }
            | AstExpr::TypeCast { pos, .. } => *pos,
            AstExpr::Annotation(a) => a.pos,
        }
    }
}

impl AstTypeExpr {
    pub fn pos(&self) -> AstPos {
        match self {
            AstTypeExpr::Simple { pos, .. }
            | AstTypeExpr::Qualified { pos, .. }
            | AstTypeExpr::Primitive { pos, .. }
            | AstTypeExpr::Array { pos, .. }
            | AstTypeExpr::Apply { pos, .. }
            | AstTypeExpr::Union { pos, .. }
            | AstTypeExpr::Wildcard { pos, .. }
            | AstTypeExpr::Erroneous { pos } => *pos,
        }
    }

    pub fn ty(&self) -> TypeId {
        match self {
            AstTypeExpr::Simple { ty, .. }
            | AstTypeExpr::Qualified { ty, .. }
            | AstTypeExpr::Primitive { ty, .. }
            | AstTypeExpr::Array { ty, .. }
            | AstTypeExpr::Apply { ty, .. }
            | AstTypeExpr::Union { ty, .. }
            | AstTypeExpr::Wildcard { ty, .. } => *ty,
            AstTypeExpr::Erroneous { .. } => TypeId::NONE,
        }
    }
}
