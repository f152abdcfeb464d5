//! Node kind tags and the precomputed base-kind lattice.
//!
//! Downstream code never chains kind checks; it either pattern-matches on the
//! node payload or asks `is_a` against this table.

use serde::{Deserialize, Serialize};

/// Concrete kind of a graph node. The discriminant is the on-disk kind tag,
/// so variants must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum NodeKind {
    // comments
    LineComment = 1,
    BlockComment = 2,
    DocComment = 3,
    // structure
    Package = 10,
    CompilationUnit = 11,
    PackageDeclaration = 12,
    Import = 13,
    Class = 14,
    ClassGeneric = 15,
    Interface = 16,
    InterfaceGeneric = 17,
    Enum = 18,
    AnnotationType = 19,
    AnonymousClass = 20,
    Method = 21,
    MethodGeneric = 22,
    AnnotationTypeElement = 23,
    Variable = 24,
    Parameter = 25,
    EnumConstant = 26,
    TypeParameter = 27,
    InstanceInitializer = 28,
    StaticInitializer = 29,
    // statements
    Assert = 40,
    BasicFor = 41,
    Block = 42,
    Break = 43,
    Case = 44,
    Continue = 45,
    Default = 46,
    Do = 47,
    Empty = 48,
    EnhancedFor = 49,
    ExpressionStatement = 50,
    Handler = 51,
    If = 52,
    LabeledStatement = 53,
    Return = 54,
    Switch = 55,
    Synchronized = 56,
    Throw = 57,
    Try = 58,
    While = 59,
    // expressions
    ArrayAccess = 70,
    Assignment = 71,
    ClassLiteral = 72,
    Conditional = 73,
    Erroneous = 74,
    FieldAccess = 75,
    Identifier = 76,
    InfixExpression = 77,
    InstanceOf = 78,
    Lambda = 79,
    Literal = 80,
    MarkerAnnotation = 81,
    MemberReference = 82,
    MethodInvocation = 83,
    NewArray = 84,
    NewClass = 85,
    NormalAnnotation = 86,
    ParenthesizedExpression = 87,
    PostfixExpression = 88,
    PrefixExpression = 89,
    SingleElementAnnotation = 90,
    Super = 91,
    This = 92,
    TypeCast = 93,
    // type expressions
    ArrayTypeExpression = 110,
    ErroneousTypeExpression = 111,
    ExternalTypeExpression = 112,
    PrimitiveTypeExpression = 113,
    QualifiedTypeExpression = 114,
    SimpleTypeExpression = 115,
    TypeApplyExpression = 116,
    TypeUnionExpression = 117,
    WildcardExpression = 118,
    // types
    ArrayType = 130,
    ClassType = 131,
    ErrorType = 132,
    MethodType = 133,
    NoType = 134,
    NullType = 135,
    PackageType = 136,
    ParameterizedType = 137,
    PrimitiveType = 138,
    TypeVariable = 139,
    UnionType = 140,
    VoidType = 141,
    WildcardType = 142,
}

/// Abstract categories a concrete kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    Comment,
    Positioned,
    Member,
    Declaration,
    TypeDeclaration,
    MethodDeclaration,
    VariableDeclaration,
    Statement,
    Loop,
    Expression,
    Annotation,
    TypeExpression,
    Type,
}

impl NodeKind {
    pub fn from_u16(tag: u16) -> Option<NodeKind> {
        use NodeKind::*;
        Some(match tag {
            1 => LineComment,
            2 => BlockComment,
            3 => DocComment,
            10 => Package,
            11 => CompilationUnit,
            12 => PackageDeclaration,
            13 => Import,
            14 => Class,
            15 => ClassGeneric,
            16 => Interface,
            17 => InterfaceGeneric,
            18 => Enum,
            19 => AnnotationType,
            20 => AnonymousClass,
            21 => Method,
            22 => MethodGeneric,
            23 => AnnotationTypeElement,
            24 => Variable,
            25 => Parameter,
            26 => EnumConstant,
            27 => TypeParameter,
            28 => InstanceInitializer,
            29 => StaticInitializer,
            40 => Assert,
            41 => BasicFor,
            42 => Block,
            43 => Break,
            44 => Case,
            45 => Continue,
            46 => Default,
            47 => Do,
            48 => Empty,
            49 => EnhancedFor,
            50 => ExpressionStatement,
            51 => Handler,
            52 => If,
            53 => LabeledStatement,
            54 => Return,
            55 => Switch,
            56 => Synchronized,
            57 => Throw,
            58 => Try,
            59 => While,
            70 => ArrayAccess,
            71 => Assignment,
            72 => ClassLiteral,
            73 => Conditional,
            74 => Erroneous,
            75 => FieldAccess,
            76 => Identifier,
            77 => InfixExpression,
            78 => InstanceOf,
            79 => Lambda,
            80 => Literal,
            81 => MarkerAnnotation,
            82 => MemberReference,
            83 => MethodInvocation,
            84 => NewArray,
            85 => NewClass,
            86 => NormalAnnotation,
            87 => ParenthesizedExpression,
            88 => PostfixExpression,
            89 => PrefixExpression,
            90 => SingleElementAnnotation,
            91 => Super,
            92 => This,
            93 => TypeCast,
            110 => ArrayTypeExpression,
            111 => ErroneousTypeExpression,
            112 => ExternalTypeExpression,
            113 => PrimitiveTypeExpression,
            114 => QualifiedTypeExpression,
            115 => SimpleTypeExpression,
            116 => TypeApplyExpression,
            117 => TypeUnionExpression,
            118 => WildcardExpression,
            130 => ArrayType,
            131 => ClassType,
            132 => ErrorType,
            133 => MethodType,
            134 => NoType,
            135 => NullType,
            136 => PackageType,
            137 => ParameterizedType,
            138 => PrimitiveType,
            139 => TypeVariable,
            140 => UnionType,
            141 => VoidType,
            142 => WildcardType,
            _ => return None,
        })
    }

    /// The base kinds this kind belongs to, as a static table lookup.
    pub fn base_kinds(self) -> &'static [BaseKind] {
        use BaseKind::*;
        use NodeKind::*;
        match self {
            LineComment | BlockComment | DocComment => &[Comment, Positioned],
            Package => &[Positioned],
            CompilationUnit => &[Positioned],
            PackageDeclaration | Import => &[Positioned],
            Class | Interface | Enum | AnnotationType | AnonymousClass => {
                &[Positioned, Member, Declaration, TypeDeclaration]
            }
            ClassGeneric | InterfaceGeneric => {
                &[Positioned, Member, Declaration, TypeDeclaration]
            }
            Method | AnnotationTypeElement => {
                &[Positioned, Member, Declaration, MethodDeclaration]
            }
            MethodGeneric => &[Positioned, Member, Declaration, MethodDeclaration],
            Variable | Parameter | EnumConstant => {
                &[Positioned, Member, Declaration, VariableDeclaration]
            }
            TypeParameter => &[Positioned, Declaration],
            InstanceInitializer | StaticInitializer => &[Positioned, Member],
            Assert | Block | Break | Case | Continue | Default | Empty
            | ExpressionStatement | Handler | If | LabeledStatement | Return | Switch
            | Synchronized | Throw | Try => &[Positioned, Statement],
            BasicFor | Do | EnhancedFor | While => &[Positioned, Statement, Loop],
            ArrayAccess | Assignment | ClassLiteral | Conditional | Erroneous
            | FieldAccess | Identifier | InfixExpression | InstanceOf | Lambda | Literal
            | MemberReference | MethodInvocation | NewArray | NewClass
            | ParenthesizedExpression | PostfixExpression | PrefixExpression | Super
            | This | TypeCast => &[Positioned, Expression],
            MarkerAnnotation | NormalAnnotation | SingleElementAnnotation => {
                &[Positioned, Expression, Annotation]
            }
            ArrayTypeExpression | ErroneousTypeExpression | ExternalTypeExpression
            | PrimitiveTypeExpression | QualifiedTypeExpression | SimpleTypeExpression
            | TypeApplyExpression | TypeUnionExpression | WildcardExpression => {
                &[Positioned, Expression, TypeExpression]
            }
            ArrayType | ClassType | ErrorType | MethodType | NoType | NullType
            | PackageType | ParameterizedType | PrimitiveType | TypeVariable
            | UnionType | VoidType | WildcardType => &[Type],
        }
    }

    pub fn is_a(self, base: BaseKind) -> bool {
        self.base_kinds().contains(&base)
    }

    pub fn is_type_declaration(self) -> bool {
        self.is_a(BaseKind::TypeDeclaration)
    }

    pub fn is_comment(self) -> bool {
        self.is_a(BaseKind::Comment)
    }

    pub fn is_type(self) -> bool {
        self.is_a(BaseKind::Type)
    }

    /// Kinds an unlabeled `break` may target.
    pub fn is_break_target(self) -> bool {
        self.is_a(BaseKind::Loop) || self == NodeKind::Switch
    }

    /// Kinds an unlabeled `continue` may target.
    pub fn is_continue_target(self) -> bool {
        self.is_a(BaseKind::Loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tag_roundtrip() {
        for tag in 0..u16::MAX {
            if let Some(kind) = NodeKind::from_u16(tag) {
                assert_eq!(kind as u16, tag);
            }
        }
    }

    #[test]
    fn test_base_kind_table() {
        assert!(NodeKind::ClassGeneric.is_a(BaseKind::TypeDeclaration));
        assert!(NodeKind::EnumConstant.is_a(BaseKind::VariableDeclaration));
        assert!(NodeKind::SimpleTypeExpression.is_a(BaseKind::Expression));
        assert!(!NodeKind::Package.is_a(BaseKind::Type));
        assert!(NodeKind::While.is_break_target());
        assert!(NodeKind::Switch.is_break_target());
        assert!(!NodeKind::Switch.is_continue_target());
    }
}
