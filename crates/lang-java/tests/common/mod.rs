//! Feed construction helpers shared by the integration suites.

#![allow(dead_code)]

use semgraph_java::oracle::ast::*;
use semgraph_java::oracle::{
    OracleFeed, SymbolFlags, SymbolId, SymbolInfo, SymbolKind, TypeEntry, TypeId,
};
use smol_str::SmolStr;

pub fn symbol(name: &str, kind: SymbolKind) -> SymbolInfo {
    SymbolInfo {
        name: SmolStr::new(name),
        kind,
        qualified_name: SmolStr::default(),
        binary_name: SmolStr::default(),
        owner: SymbolId::NONE,
        ty: TypeId::NONE,
        modifiers: Default::default(),
        flags: SymbolFlags::default(),
        members: Vec::new(),
        superclass: TypeId::NONE,
        interfaces: Vec::new(),
        type_params: Vec::new(),
        params: Vec::new(),
        return_type: TypeId::NONE,
        thrown: Vec::new(),
        erased_signature: SmolStr::default(),
    }
}

#[derive(Default)]
pub struct FeedBuilder {
    pub feed: OracleFeed,
}

impl FeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, info: SymbolInfo) -> SymbolId {
        self.feed.symbols.push(info);
        SymbolId(self.feed.symbols.len() as u32)
    }

    pub fn add_type(&mut self, entry: TypeEntry) -> TypeId {
        self.feed.types.push(entry);
        TypeId(self.feed.types.len() as u32)
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut SymbolInfo {
        &mut self.feed.symbols[id.0 as usize - 1]
    }

    pub fn package(&mut self, qualified: &str) -> SymbolId {
        let name = qualified.rsplit('.').next().unwrap_or(qualified);
        let mut info = symbol(name, SymbolKind::Package);
        info.qualified_name = SmolStr::new(qualified);
        self.add_symbol(info)
    }

    /// A class/interface symbol plus its declared type.
    pub fn type_symbol(
        &mut self,
        name: &str,
        kind: SymbolKind,
        owner: SymbolId,
    ) -> (SymbolId, TypeId) {
        let mut info = symbol(name, kind);
        info.owner = owner;
        info.qualified_name = SmolStr::new(name);
        info.binary_name = SmolStr::new(name);
        let sym = self.add_symbol(info);
        let ty = self.add_type(TypeEntry::Declared {
            symbol: sym,
            args: Vec::new(),
            owner: TypeId::NONE,
            erasure: TypeId::NONE,
        });
        self.symbol_mut(sym).ty = ty;
        (sym, ty)
    }

    /// A niladic method symbol with its executable type.
    pub fn method_symbol(
        &mut self,
        name: &str,
        owner: SymbolId,
        return_type: TypeId,
    ) -> (SymbolId, TypeId) {
        let exec = self.add_type(TypeEntry::Executable {
            return_type,
            params: Vec::new(),
            thrown: Vec::new(),
        });
        let mut info = symbol(name, SymbolKind::Method);
        info.owner = owner;
        info.qualified_name = SmolStr::new(name);
        info.ty = exec;
        info.return_type = return_type;
        info.erased_signature = SmolStr::new(format!("{name}()"));
        let sym = self.add_symbol(info);
        self.link_member(owner, sym);
        (sym, exec)
    }

    pub fn field_symbol(&mut self, name: &str, owner: SymbolId, ty: TypeId) -> SymbolId {
        let mut info = symbol(name, SymbolKind::Field);
        info.owner = owner;
        info.qualified_name = SmolStr::new(name);
        info.ty = ty;
        let sym = self.add_symbol(info);
        self.link_member(owner, sym);
        sym
    }

    pub fn link_member(&mut self, owner: SymbolId, member: SymbolId) {
        if owner.is_some() {
            self.symbol_mut(owner).members.push(member);
        }
    }

    pub fn void_type(&mut self) -> TypeId {
        self.add_type(TypeEntry::Void)
    }

    pub fn bool_type(&mut self) -> TypeId {
        self.add_type(TypeEntry::Primitive {
            primitive: semgraph_core::graph::PrimitiveKind::Boolean,
        })
    }

    pub fn int_type(&mut self) -> TypeId {
        self.add_type(TypeEntry::Primitive {
            primitive: semgraph_core::graph::PrimitiveKind::Int,
        })
    }

    pub fn array_type(&mut self, elem: TypeId, dims: u32) -> TypeId {
        self.add_type(TypeEntry::Array { elem, dims })
    }
}

// ---- AST shorthand ----

pub fn sp(line: u32, col: u32, end_line: u32, end_col: u32) -> AstSpan {
    AstSpan::new(line, col, end_line, end_col)
}

pub fn at(line: u32, col: u32, end_line: u32, end_col: u32) -> AstPos {
    AstPos::tight(sp(line, col, end_line, end_col))
}

pub fn simple_type(name: &str, symbol: SymbolId, ty: TypeId, pos: AstPos) -> AstTypeExpr {
    AstTypeExpr::Simple {
        name: SmolStr::new(name),
        symbol,
        ty,
        pos,
    }
}

pub fn ident(name: &str, symbol: SymbolId, ty: TypeId, pos: AstPos) -> AstExpr {
    AstExpr::Identifier {
        name: SmolStr::new(name),
        symbol,
        ty,
        pos,
    }
}

pub fn int_literal(value: i64, ty: TypeId, pos: AstPos) -> AstExpr {
    AstExpr::Literal {
        value: AstLiteral::Int(value),
        text: SmolStr::new(value.to_string()),
        ty,
        pos,
    }
}

pub fn call(callee: AstExpr, symbol: SymbolId, ty: TypeId, pos: AstPos) -> AstExpr {
    AstExpr::MethodInvocation {
        callee: Box::new(callee),
        type_args: Vec::new(),
        args: Vec::new(),
        symbol,
        ty,
        pos,
    }
}

pub fn expr_stmt(expr: AstExpr, pos: AstPos) -> AstStmt {
    AstStmt::Expression {
        expr: Box::new(expr),
        pos,
    }
}

pub fn block(statements: Vec<AstStmt>, pos: AstPos) -> AstStmt {
    AstStmt::Block { statements, pos }
}

pub fn while_loop(condition: AstExpr, body: AstStmt, pos: AstPos) -> AstStmt {
    AstStmt::While {
        condition: Box::new(condition),
        body: Box::new(body),
        pos,
    }
}

pub fn method_decl(
    name: &str,
    symbol: SymbolId,
    return_type: Option<AstTypeExpr>,
    body: Option<AstStmt>,
    pos: AstPos,
) -> AstMethodDecl {
    AstMethodDecl {
        name: SmolStr::new(name),
        symbol,
        is_constructor: false,
        is_generated: false,
        is_annotation_element: false,
        modifiers: Default::default(),
        annotations: Vec::new(),
        type_params: Vec::new(),
        params: Vec::new(),
        return_type,
        thrown: Vec::new(),
        body,
        default_value: None,
        pos,
        name_span: None,
    }
}

pub fn field_decl(
    name: &str,
    symbol: SymbolId,
    var_type: Option<AstTypeExpr>,
    init: Option<AstExpr>,
    pos: AstPos,
) -> AstVarDecl {
    AstVarDecl {
        name: SmolStr::new(name),
        symbol,
        modifiers: Default::default(),
        annotations: Vec::new(),
        var_type,
        init,
        pos,
        name_span: None,
    }
}

pub fn class_decl(
    name: &str,
    symbol: SymbolId,
    superclass: Option<AstTypeExpr>,
    interfaces: Vec<AstTypeExpr>,
    members: Vec<AstMember>,
    pos: AstPos,
) -> AstTypeDecl {
    AstTypeDecl {
        shape: AstTypeShape::Class,
        name: SmolStr::new(name),
        symbol,
        modifiers: Default::default(),
        annotations: Vec::new(),
        type_params: Vec::new(),
        superclass,
        implicit_superclass: TypeId::NONE,
        interfaces,
        members,
        pos,
        name_span: None,
    }
}

pub fn unit(path: &str, package: SymbolId, items: Vec<AstItem>) -> semgraph_java::oracle::SourceUnit {
    semgraph_java::oracle::SourceUnit {
        path: path.to_string(),
        package,
        package_name: None,
        package_annotations: Vec::new(),
        items,
        comments: Vec::new(),
        source: None,
    }
}

pub fn bool_literal(value: bool, ty: TypeId, pos: AstPos) -> AstExpr {
    AstExpr::Literal {
        value: AstLiteral::Bool(value),
        text: SmolStr::new(if value { "true" } else { "false" }),
        ty,
        pos,
    }
}

// ---- graph lookup ----

use semgraph_core::graph::{DeclNode, Graph, NodeData, NodeId};

pub fn find_decls(graph: &Graph, name: &str) -> Vec<NodeId> {
    graph
        .iter()
        .filter_map(|(id, node)| match &node.data {
            NodeData::Decl(DeclNode { name: n, .. }) if n == name => Some(id),
            _ => None,
        })
        .collect()
}

pub fn find_decl(graph: &Graph, name: &str) -> Option<NodeId> {
    find_decls(graph, name).into_iter().next()
}

/// The declaration `member_name` whose owning declaration is `owner_name`.
pub fn find_member(graph: &Graph, owner_name: &str, member_name: &str) -> Option<NodeId> {
    find_decls(graph, member_name).into_iter().find(|&id| {
        let parent = graph.parent(id).unwrap_or(NodeId::NONE);
        matches!(
            graph.node(parent).map(|n| &n.data),
            Ok(NodeData::Decl(DeclNode { name, .. })) if name == owner_name
        )
    })
}
