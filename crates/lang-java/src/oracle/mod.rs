//! The narrow interface to the front-end oracle.
//!
//! Lexing, parsing, name binding and type checking happen upstream; this
//! module only models what the oracle hands over: per-unit syntax trees with
//! resolved symbol/type references, the symbol table, the type table and the
//! raw comment feed. Everything is plain serde data so a feed can be read
//! from disk or assembled in tests.

pub mod ast;

use crate::error::{BuildError, Result};
use semgraph_core::graph::{Modifiers, PrimitiveKind, WildcardBound};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::path::Path;

/// Opaque symbol handle assigned by the oracle. Zero means "no symbol".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

/// Opaque semantic type handle. The oracle canonicalizes: one id per
/// distinct type value, which is what the type graph memoizes on.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const NONE: TypeId = TypeId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Package,
    Class,
    Interface,
    Enum,
    AnnotationType,
    Method,
    Constructor,
    StaticInit,
    Field,
    EnumConstant,
    Parameter,
    LocalVariable,
    ExceptionParameter,
    TypeParameter,
}

impl SymbolKind {
    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Enum | SymbolKind::AnnotationType
        )
    }

    pub fn is_method_like(self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Constructor)
    }

    pub fn is_variable_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Field
                | SymbolKind::EnumConstant
                | SymbolKind::Parameter
                | SymbolKind::LocalVariable
                | SymbolKind::ExceptionParameter
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFlags {
    /// Compiler-synthesized placeholder (builtin, error or "none" symbols);
    /// the closure builder skips these.
    #[serde(default)]
    pub is_placeholder: bool,
    /// Generated member such as a default constructor.
    #[serde(default)]
    pub is_synthetic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: SmolStr,
    pub kind: SymbolKind,
    #[serde(default)]
    pub qualified_name: SmolStr,
    /// Flat binary name for type declarations, e.g. `p.Outer$Inner`.
    #[serde(default)]
    pub binary_name: SmolStr,
    #[serde(default)]
    pub owner: SymbolId,
    /// The symbol's own semantic type (declared type for classes, executable
    /// type for methods, value type for variables).
    #[serde(default)]
    pub ty: TypeId,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub flags: SymbolFlags,
    /// Enclosed elements, in declaration order.
    #[serde(default)]
    pub members: Vec<SymbolId>,
    #[serde(default)]
    pub superclass: TypeId,
    #[serde(default)]
    pub interfaces: Vec<TypeId>,
    /// Type-variable type ids of a generic declaration.
    #[serde(default)]
    pub type_params: Vec<TypeId>,
    #[serde(default)]
    pub params: Vec<SymbolId>,
    #[serde(default)]
    pub return_type: TypeId,
    #[serde(default)]
    pub thrown: Vec<TypeId>,
    /// Erasure-level signature computed by the oracle, e.g.
    /// `run(int,java.lang.String)`. Override compatibility is answered from
    /// this, keeping the language-specific rules on the oracle side.
    #[serde(default)]
    pub erased_signature: SmolStr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeEntry {
    Primitive { primitive: PrimitiveKind },
    Void,
    Null,
    None,
    Error,
    Array { elem: TypeId, dims: u32 },
    Declared {
        symbol: SymbolId,
        #[serde(default)]
        args: Vec<TypeId>,
        #[serde(default)]
        owner: TypeId,
        /// Erased form of a parameterized use; `NONE` when this already is
        /// the raw type.
        #[serde(default)]
        erasure: TypeId,
    },
    Wildcard {
        bound_kind: WildcardBound,
        #[serde(default)]
        bound: TypeId,
    },
    Variable {
        symbol: SymbolId,
        name: SmolStr,
    },
    Union { alternatives: Vec<TypeId> },
    Executable {
        #[serde(default)]
        return_type: TypeId,
        #[serde(default)]
        params: Vec<TypeId>,
        #[serde(default)]
        thrown: Vec<TypeId>,
    },
    Package { symbol: SymbolId },
}

/// Symbol and type tables, indexed by the oracle's ids (1-based).
#[derive(Debug, Default)]
pub struct SemanticModel {
    symbols: Vec<SymbolInfo>,
    types: Vec<TypeEntry>,
}

impl SemanticModel {
    pub fn new(symbols: Vec<SymbolInfo>, types: Vec<TypeEntry>) -> Self {
        Self { symbols, types }
    }

    pub fn symbol(&self, id: SymbolId) -> Result<&SymbolInfo> {
        self.try_symbol(id)
            .ok_or_else(|| BuildError::Oracle(format!("unknown symbol id {}", id.0)))
    }

    pub fn try_symbol(&self, id: SymbolId) -> Option<&SymbolInfo> {
        if id.is_none() {
            return None;
        }
        self.symbols.get(id.0 as usize - 1)
    }

    pub fn ty(&self, id: TypeId) -> Result<&TypeEntry> {
        self.try_ty(id)
            .ok_or_else(|| BuildError::Oracle(format!("unknown type id {}", id.0)))
    }

    pub fn try_ty(&self, id: TypeId) -> Option<&TypeEntry> {
        if id.is_none() {
            return None;
        }
        self.types.get(id.0 as usize - 1)
    }

    /// Symbol a declared type refers to, if `id` is a declared type.
    pub fn declared_symbol(&self, id: TypeId) -> Option<SymbolId> {
        match self.try_ty(id)? {
            TypeEntry::Declared { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    /// Whether `sym` is a placeholder or carries an error type: never built
    /// by the closure.
    pub fn is_skippable(&self, sym: SymbolId) -> bool {
        match self.try_symbol(sym) {
            None => true,
            Some(info) => {
                info.flags.is_placeholder
                    || matches!(self.try_ty(info.ty), Some(TypeEntry::Error))
            }
        }
    }

    /// The oracle's override-compatibility predicate: name/arity/erasure and
    /// visibility rules were folded into the erased signature upstream.
    pub fn is_override_compatible(&self, method: SymbolId, candidate: SymbolId) -> bool {
        let (Some(a), Some(b)) = (self.try_symbol(method), self.try_symbol(candidate)) else {
            return false;
        };
        if a.kind != SymbolKind::Method || b.kind != SymbolKind::Method {
            return false;
        }
        !a.erased_signature.is_empty() && a.erased_signature == b.erased_signature
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceComment {
    pub style: semgraph_core::graph::CommentStyle,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub text: String,
}

/// One analyzed compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    pub path: String,
    pub package: SymbolId,
    /// The package-declaration name expression, absent in the unnamed
    /// package.
    #[serde(default)]
    pub package_name: Option<ast::AstExpr>,
    #[serde(default)]
    pub package_annotations: Vec<ast::AstAnnotation>,
    #[serde(default)]
    pub items: Vec<ast::AstItem>,
    #[serde(default)]
    pub comments: Vec<SourceComment>,
    /// Raw text, when available, for the logical-line classifier.
    #[serde(default)]
    pub source: Option<String>,
}

/// Everything the oracle hands over for one run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OracleFeed {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    #[serde(default)]
    pub units: Vec<SourceUnit>,
}

impl OracleFeed {
    pub fn from_json_file(path: &Path) -> Result<OracleFeed> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn into_parts(self) -> (SemanticModel, Vec<SourceUnit>) {
        (SemanticModel::new(self.symbols, self.types), self.units)
    }
}
