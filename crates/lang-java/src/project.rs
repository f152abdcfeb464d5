//! Tree projection: one pass over the oracle's syntax tree, one graph node
//! per construct.
//!
//! Besides the 1:1 translation this pass computes narrow/wide ranges,
//! propagates the synthesized flag down generated subtrees, deduplicates the
//! package hierarchy by qualified name, and records every declaration and
//! reference into the maps the later stages drain.

use crate::error::Result;
use crate::maps::SymbolMaps;
use crate::oracle::ast::*;
use crate::oracle::{SemanticModel, SourceUnit, SymbolId, TypeId};
use semgraph_core::diagnostics::{Diagnostic, Diagnostics};
use semgraph_core::graph::{
    CompilationUnitNode, DeclData, DeclNode, ExprData, ExprNode, Graph, MethodData, MethodKind,
    Modifiers, Node, NodeData, NodeId, PackageNode, Point, Range, StmtNode, TypeDeclData,
    TypeShape, VarShape, VariableData,
};
use semgraph_core::storage::strtable::StrKey;
use indexmap::IndexMap;
use indexmap::IndexSet;
use smol_str::SmolStr;

pub struct Projector<'a> {
    graph: &'a mut Graph,
    maps: &'a mut SymbolMaps,
    model: &'a SemanticModel,
    diags: &'a mut Diagnostics,
    path_key: StrKey,
    /// Depth of the surrounding generated subtree; positive depth means no
    /// node below reports a source position.
    generated_depth: u32,
    seen_binary_names: IndexMap<SmolStr, NodeId>,
}

impl<'a> Projector<'a> {
    pub fn new(
        graph: &'a mut Graph,
        maps: &'a mut SymbolMaps,
        model: &'a SemanticModel,
        diags: &'a mut Diagnostics,
    ) -> Self {
        Self {
            graph,
            maps,
            model,
            diags,
            path_key: StrKey::NONE,
            generated_depth: 0,
            seen_binary_names: IndexMap::new(),
        }
    }

    pub fn project_unit(&mut self, unit: &SourceUnit) -> Result<NodeId> {
        tracing::info!(path = %unit.path, "projecting unit");
        self.path_key = self.graph.intern(&unit.path);

        let package = ensure_package_chain(self.graph, self.maps, self.model, unit.package)?;

        let package_declaration = match &unit.package_name {
            Some(name_expr) => {
                let name = self.project_expr(name_expr)?;
                let node = Node::new(NodeData::PackageDeclaration {
                    package_name: name,
                    refers_to: package,
                });
                self.insert_at(node, Some(name_expr.pos()))?
            }
            None => NodeId::NONE,
        };

        for annotation in &unit.package_annotations {
            let id = self.project_annotation(annotation)?;
            self.graph.add_package_annotation(package, id)?;
        }

        let mut imports = Vec::new();
        let mut others = Vec::new();
        let mut decls = Vec::new();
        for item in &unit.items {
            match item {
                AstItem::Import(import) => {
                    let target = self.project_expr(&import.target)?;
                    let node = Node::new(NodeData::Import {
                        is_static: import.is_static,
                        target,
                    });
                    imports.push(self.insert_at(node, Some(import.pos))?);
                }
                AstItem::Type(decl) => decls.push(self.project_type_decl(decl, false)?),
                AstItem::Empty { pos } => {
                    others.push(self.insert_at(Node::new(NodeData::Stmt(StmtNode::Empty)), Some(*pos))?)
                }
            }
        }

        let unit_end = unit
            .source
            .as_deref()
            .map(|s| s.lines().count() as u32)
            .unwrap_or(0);
        let mut cu_node = Node::new(NodeData::CompilationUnit(CompilationUnitNode {
            package_declaration,
            imports,
            others,
            type_declarations: Vec::new(),
            lloc: 0,
        }));
        cu_node.span = Some(Range::new(
            self.path_key,
            Point::new(1, 1),
            Point::new(unit_end.max(1), 1),
        ));
        let cu = self.graph.insert(cu_node)?;
        self.graph.add_compilation_unit(package, cu)?;

        for decl in decls {
            self.graph.add_member(package, decl)?;
            self.graph.associate_type_declaration(cu, decl)?;
        }

        Ok(cu)
    }

    // ---- positions ----

    fn range_of(&self, pos: AstPos) -> Range {
        Range::new(
            self.path_key,
            Point::new(pos.narrow.line, pos.narrow.col),
            Point::new(pos.narrow.end_line, pos.narrow.end_col),
        )
        .with_wide(
            Point::new(pos.wide_or_narrow().line, pos.wide_or_narrow().col),
            Point::new(pos.wide_or_narrow().end_line, pos.wide_or_narrow().end_col),
        )
    }

    fn span_range(&self, span: AstSpan) -> Range {
        Range::new(
            self.path_key,
            Point::new(span.line, span.col),
            Point::new(span.end_line, span.end_col),
        )
    }

    fn opt_span(&self, span: Option<AstSpan>) -> Option<Range> {
        if self.generated_depth > 0 {
            return None;
        }
        span.filter(|s| s.is_set()).map(|s| self.span_range(s))
    }

    /// Inserts a node, either positioned or flagged as compiler generated;
    /// a node inside a generated subtree never reports a source position.
    fn insert_at(&mut self, mut node: Node, pos: Option<AstPos>) -> Result<NodeId> {
        if self.generated_depth > 0 {
            node.compiler_generated = true;
        } else if let Some(pos) = pos {
            if pos.narrow.is_set() || pos.wide.is_set() {
                node.span = Some(self.range_of(pos));
            }
        }
        Ok(self.graph.insert(node)?)
    }

    // ---- declarations ----

    fn project_type_decl(&mut self, decl: &AstTypeDecl, anonymous: bool) -> Result<NodeId> {
        let info = self.model.symbol(decl.symbol)?;
        let binary_name = info.binary_name.clone();

        let annotations = self.project_annotations(&decl.annotations)?;
        let type_parameters = self.project_type_params(&decl.type_params)?;

        let superclass = match &decl.superclass {
            Some(expr) => self.project_type_expr(expr)?,
            None if decl.implicit_superclass.is_some() => {
                self.synthesized_type_expr(decl.implicit_superclass)?
            }
            None => NodeId::NONE,
        };
        let mut super_interfaces = Vec::new();
        for interface in &decl.interfaces {
            super_interfaces.push(self.project_type_expr(interface)?);
        }

        let mut members = Vec::new();
        let mut others = Vec::new();
        for member in &decl.members {
            match member {
                AstMember::Field(v) => members.push(self.project_var_decl(v, VarShape::Field)?),
                AstMember::EnumConstant(v) => {
                    members.push(self.project_var_decl(v, VarShape::EnumConstant)?)
                }
                AstMember::Method(m) => members.push(self.project_method(m)?),
                AstMember::Type(t) => members.push(self.project_type_decl(t, false)?),
                AstMember::Initializer {
                    is_static,
                    body,
                    pos,
                } => {
                    let block = self.project_stmt(body)?;
                    let node = Node::new(NodeData::InitializerBlock {
                        is_static: *is_static,
                        body: block,
                        lloc: 0,
                    });
                    members.push(self.insert_at(node, Some(*pos))?);
                }
                AstMember::Empty { pos } => {
                    others.push(self.insert_at(Node::new(NodeData::Stmt(StmtNode::Empty)), Some(*pos))?)
                }
            }
        }

        let shape = if anonymous {
            TypeShape::Anonymous
        } else {
            match decl.shape {
                AstTypeShape::Class => TypeShape::Class,
                AstTypeShape::Interface => TypeShape::Interface,
                AstTypeShape::Enum => TypeShape::Enum,
                AstTypeShape::Annotation => TypeShape::Annotation,
            }
        };
        let node = Node::new(NodeData::Decl(DeclNode {
            name: decl.name.clone(),
            name_span: self.opt_span(decl.name_span),
            modifiers: decl.modifiers,
            annotations,
            data: DeclData::Type(TypeDeclData {
                shape,
                is_generic: !decl.type_params.is_empty(),
                binary_name: binary_name.clone(),
                type_parameters,
                superclass,
                super_interfaces,
                members,
                others,
                in_compilation_unit: NodeId::NONE,
                lloc: 0,
            }),
        }));
        let id = self.insert_at(node, Some(decl.pos))?;

        self.maps.decls.inner_types.insert(decl.symbol, id);
        if !binary_name.is_empty() {
            if let Some(&first) = self.seen_binary_names.get(&binary_name) {
                self.diags.report(Diagnostic::DuplicateBinaryName {
                    name: binary_name.clone(),
                    first,
                    second: id,
                });
            } else {
                self.seen_binary_names.insert(binary_name, id);
            }
        }

        // Enums owe their synthesized lookup members to the closure stage.
        if shape == TypeShape::Enum {
            for &member in &info.members {
                if let Some(m) = self.model.try_symbol(member) {
                    if m.flags.is_synthetic && (m.name == "values" || m.name == "valueOf") {
                        self.maps.closure.enum_functions.insert(member, id);
                    }
                }
            }
        }

        if decl.superclass.is_some() || !decl.interfaces.is_empty() {
            add_parents_to_full_build(self.model, self.maps, decl.symbol);
        }

        Ok(id)
    }

    fn project_method(&mut self, m: &AstMethodDecl) -> Result<NodeId> {
        if m.is_generated {
            self.generated_depth += 1;
        }
        let result = self.project_method_inner(m);
        if m.is_generated {
            self.generated_depth -= 1;
        }
        result
    }

    fn project_method_inner(&mut self, m: &AstMethodDecl) -> Result<NodeId> {
        let annotations = self.project_annotations(&m.annotations)?;

        let data = if m.is_annotation_element {
            let return_type = match &m.return_type {
                Some(expr) => self.project_type_expr(expr)?,
                None => NodeId::NONE,
            };
            let default_value = match &m.default_value {
                Some(expr) => self.project_expr(expr)?,
                None => NodeId::NONE,
            };
            DeclData::AnnotationElement {
                return_type,
                default_value,
                method_type: NodeId::NONE,
            }
        } else {
            let type_parameters = self.project_type_params(&m.type_params)?;
            let mut parameters = Vec::new();
            for param in &m.params {
                parameters.push(self.project_var_decl(param, VarShape::Parameter)?);
            }
            // Constructors have no declared return type.
            let return_type = match (&m.return_type, m.is_constructor) {
                (Some(expr), false) => self.project_type_expr(expr)?,
                _ => NodeId::NONE,
            };
            let mut thrown_exceptions = Vec::new();
            for thrown in &m.thrown {
                thrown_exceptions.push(self.project_type_expr(thrown)?);
            }
            let body = match &m.body {
                Some(stmt) => self.project_stmt(stmt)?,
                None => NodeId::NONE,
            };
            DeclData::Method(MethodData {
                is_generic: !m.type_params.is_empty(),
                method_kind: if m.is_constructor {
                    MethodKind::Constructor
                } else {
                    MethodKind::Normal
                },
                type_parameters,
                parameters,
                return_type,
                thrown_exceptions,
                body,
                method_type: NodeId::NONE,
                overrides: NodeId::NONE,
                lloc: 0,
            })
        };

        let node = Node::new(NodeData::Decl(DeclNode {
            name: m.name.clone(),
            name_span: self.opt_span(m.name_span),
            modifiers: m.modifiers,
            annotations,
            data,
        }));
        let id = self.insert_at(node, Some(m.pos))?;

        if m.symbol.is_some() {
            self.maps.decls.methods.insert(m.symbol, id);
            let exec_ty = self.model.symbol(m.symbol)?.ty;
            self.maps.refs.record_type_use(exec_ty, id);
        }
        Ok(id)
    }

    fn project_var_decl(&mut self, v: &AstVarDecl, shape: VarShape) -> Result<NodeId> {
        let annotations = self.project_annotations(&v.annotations)?;
        let var_type = match &v.var_type {
            Some(expr) => {
                let id = self.project_type_expr(expr)?;
                // The written type of an enum constant is the enum itself
                // and never appears in source.
                if shape == VarShape::EnumConstant {
                    self.graph.node_mut(id)?.compiler_generated = true;
                }
                id
            }
            None => NodeId::NONE,
        };
        let init = match &v.init {
            Some(expr) => self.project_expr(expr)?,
            None => NodeId::NONE,
        };
        if shape == VarShape::EnumConstant && init.is_some() {
            self.mark_enum_constant_construction(init)?;
        }

        let node = Node::new(NodeData::Decl(DeclNode {
            name: v.name.clone(),
            name_span: self.opt_span(v.name_span),
            modifiers: v.modifiers,
            annotations,
            data: DeclData::Variable(VariableData {
                shape,
                var_type,
                init,
            }),
        }));
        let id = self.insert_at(node, Some(v.pos))?;

        if v.symbol.is_some() {
            self.maps.decls.variables.insert(v.symbol, id);
        }
        Ok(id)
    }

    /// The constructed type name inside an enum-constant initializer is
    /// synthesized, as is an anonymous constant body's superclass reference.
    fn mark_enum_constant_construction(&mut self, init: NodeId) -> Result<()> {
        let (type_name, anonymous) = match &self.graph.node(init)?.data {
            NodeData::Expr(ExprNode {
                data:
                    ExprData::NewClass {
                        type_name,
                        anonymous_class,
                        ..
                    },
                ..
            }) => (*type_name, *anonymous_class),
            _ => return Ok(()),
        };
        if type_name.is_some() {
            self.graph.node_mut(type_name)?.compiler_generated = true;
        }
        if anonymous.is_some() {
            let superclass = match &self.graph.node(anonymous)?.data {
                NodeData::Decl(DeclNode {
                    data: DeclData::Type(t),
                    ..
                }) => t.superclass,
                _ => NodeId::NONE,
            };
            if superclass.is_some() {
                self.graph.node_mut(superclass)?.compiler_generated = true;
            }
        }
        Ok(())
    }

    fn project_type_params(&mut self, params: &[AstTypeParam]) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for param in params {
            let mut bounds = Vec::new();
            for bound in &param.bounds {
                bounds.push(self.project_type_expr(bound)?);
            }
            let node = Node::new(NodeData::Decl(DeclNode {
                name: param.name.clone(),
                name_span: None,
                modifiers: Modifiers::default(),
                annotations: Vec::new(),
                data: DeclData::TypeParameter { bounds },
            }));
            let id = self.insert_at(node, Some(param.pos))?;
            self.maps.decls.type_params.insert(param.ty, id);
            out.push(id);
        }
        Ok(out)
    }

    fn project_annotations(&mut self, annotations: &[AstAnnotation]) -> Result<Vec<NodeId>> {
        annotations
            .iter()
            .map(|a| self.project_annotation(a))
            .collect()
    }

    fn project_annotation(&mut self, a: &AstAnnotation) -> Result<NodeId> {
        let data = match a.args.as_slice() {
            [] => {
                let annotation_name = self.project_type_expr(&a.name)?;
                ExprData::MarkerAnnotation { annotation_name }
            }
            [single] if single_element_argument(single) => {
                let argument = match single {
                    AstExpr::Assign { right, .. } => self.project_expr(right)?,
                    other => self.project_expr(other)?,
                };
                let annotation_name = self.project_type_expr(&a.name)?;
                ExprData::SingleElementAnnotation {
                    annotation_name,
                    argument,
                }
            }
            args => {
                let mut arguments = Vec::new();
                for arg in args {
                    arguments.push(self.project_expr(arg)?);
                }
                let annotation_name = self.project_type_expr(&a.name)?;
                ExprData::NormalAnnotation {
                    annotation_name,
                    arguments,
                }
            }
        };
        let node = Node::new(NodeData::Expr(ExprNode {
            ty: NodeId::NONE,
            data,
        }));
        let id = self.insert_at(node, Some(a.pos))?;
        self.maps.refs.record_type_use(a.ty, id);
        Ok(id)
    }

    // ---- statements ----

    fn project_stmt(&mut self, stmt: &AstStmt) -> Result<NodeId> {
        let (data, pos) = match stmt {
            AstStmt::Assert {
                condition,
                detail,
                pos,
            } => {
                let condition = self.project_expr(condition)?;
                let detail = match detail {
                    Some(d) => self.project_expr(d)?,
                    None => NodeId::NONE,
                };
                (StmtNode::Assert { condition, detail }, *pos)
            }
            AstStmt::BasicFor {
                init,
                condition,
                update,
                body,
                semi_spans,
                pos,
            } => {
                let mut initializers = Vec::new();
                for stmt in init {
                    initializers.push(self.project_stmt(stmt)?);
                }
                let condition = match condition {
                    Some(c) => self.project_expr(c)?,
                    None => NodeId::NONE,
                };
                let mut updates = Vec::new();
                for stmt in update {
                    updates.push(self.project_stmt(stmt)?);
                }
                let body = self.project_stmt(body)?;
                let (first_semi, second_semi) = match semi_spans {
                    Some((a, b)) => (self.opt_span(Some(*a)), self.opt_span(Some(*b))),
                    None => (None, None),
                };
                (
                    StmtNode::BasicFor {
                        initializers,
                        condition,
                        updates,
                        body,
                        first_semi,
                        second_semi,
                    },
                    *pos,
                )
            }
            AstStmt::Block { statements, pos } => {
                let mut out = Vec::new();
                for stmt in statements {
                    out.push(self.project_stmt(stmt)?);
                }
                (StmtNode::Block { statements: out }, *pos)
            }
            AstStmt::Break {
                label,
                label_span,
                pos,
            } => (
                StmtNode::Break {
                    label: label.clone(),
                    label_span: self.opt_span(*label_span),
                    target: NodeId::NONE,
                },
                *pos,
            ),
            AstStmt::Continue {
                label,
                label_span,
                pos,
            } => (
                StmtNode::Continue {
                    label: label.clone(),
                    label_span: self.opt_span(*label_span),
                    target: NodeId::NONE,
                },
                *pos,
            ),
            AstStmt::Do {
                condition,
                body,
                pos,
            } => {
                let condition = self.project_expr(condition)?;
                let body = self.project_stmt(body)?;
                (StmtNode::Do { condition, body }, *pos)
            }
            AstStmt::Empty { pos } => (StmtNode::Empty, *pos),
            AstStmt::EnhancedFor {
                param,
                expr,
                body,
                pos,
            } => {
                let parameter = self.project_var_decl(param, VarShape::Parameter)?;
                let expression = self.project_expr(expr)?;
                let body = self.project_stmt(body)?;
                (
                    StmtNode::EnhancedFor {
                        parameter,
                        expression,
                        body,
                    },
                    *pos,
                )
            }
            AstStmt::Expression { expr, pos } => {
                let expression = self.project_expr(expr)?;
                (StmtNode::ExpressionStatement { expression }, *pos)
            }
            AstStmt::If {
                condition,
                then_branch,
                else_branch,
                pos,
            } => {
                let condition = self.project_expr(condition)?;
                let then_branch = self.project_stmt(then_branch)?;
                let else_branch = match else_branch {
                    Some(stmt) => self.project_stmt(stmt)?,
                    None => NodeId::NONE,
                };
                (
                    StmtNode::If {
                        condition,
                        then_branch,
                        else_branch,
                    },
                    *pos,
                )
            }
            AstStmt::Labeled {
                label,
                statement,
                pos,
            } => {
                let statement = self.project_stmt(statement)?;
                (
                    StmtNode::LabeledStatement {
                        label: label.clone(),
                        statement,
                    },
                    *pos,
                )
            }
            AstStmt::LocalType(decl) => return self.project_type_decl(decl, false),
            AstStmt::LocalVar(v) => return self.project_var_decl(v, VarShape::Field),
            AstStmt::Return { expr, pos } => {
                let expression = match expr {
                    Some(e) => self.project_expr(e)?,
                    None => NodeId::NONE,
                };
                (StmtNode::Return { expression }, *pos)
            }
            AstStmt::Switch {
                selector,
                cases,
                pos,
            } => {
                let condition = self.project_expr(selector)?;
                let mut case_ids = Vec::new();
                for case in cases {
                    let mut statements = Vec::new();
                    for stmt in &case.statements {
                        statements.push(self.project_stmt(stmt)?);
                    }
                    let data = match &case.pattern {
                        Some(pattern) => {
                            let expression = self.project_expr(pattern)?;
                            StmtNode::Case {
                                expression,
                                statements,
                            }
                        }
                        None => StmtNode::Default { statements },
                    };
                    case_ids.push(self.insert_at(Node::new(NodeData::Stmt(data)), Some(case.pos))?);
                }
                (
                    StmtNode::Switch {
                        condition,
                        cases: case_ids,
                    },
                    *pos,
                )
            }
            AstStmt::Synchronized { lock, block, pos } => {
                let lock = self.project_expr(lock)?;
                let block = self.project_stmt(block)?;
                (StmtNode::Synchronized { lock, block }, *pos)
            }
            AstStmt::Throw { expr, pos } => {
                let expression = self.project_expr(expr)?;
                (StmtNode::Throw { expression }, *pos)
            }
            AstStmt::Try {
                resources,
                block,
                catches,
                finally,
                pos,
            } => {
                let mut resource_ids = Vec::new();
                for resource in resources {
                    resource_ids.push(self.project_var_decl(resource, VarShape::Field)?);
                }
                let block = self.project_stmt(block)?;
                let mut handlers = Vec::new();
                for catch in catches {
                    let parameter = self.project_var_decl(&catch.param, VarShape::Parameter)?;
                    let handler_block = self.project_stmt(&catch.block)?;
                    handlers.push(self.insert_at(
                        Node::new(NodeData::Stmt(StmtNode::Handler {
                            parameter,
                            block: handler_block,
                        })),
                        Some(catch.pos),
                    )?);
                }
                let finally_block = match finally {
                    Some(stmt) => self.project_stmt(stmt)?,
                    None => NodeId::NONE,
                };
                (
                    StmtNode::Try {
                        resources: resource_ids,
                        block,
                        handlers,
                        finally_block,
                    },
                    *pos,
                )
            }
            AstStmt::While {
                condition,
                body,
                pos,
            } => {
                let condition = self.project_expr(condition)?;
                let body = self.project_stmt(body)?;
                (StmtNode::While { condition, body }, *pos)
            }
        };

        let id = self.insert_at(Node::new(NodeData::Stmt(data)), Some(pos))?;
        if matches!(
            self.graph.node(id)?.data,
            NodeData::Stmt(StmtNode::Break { .. }) | NodeData::Stmt(StmtNode::Continue { .. })
        ) {
            self.maps.refs.jumps.push(id);
        }
        Ok(id)
    }

    // ---- expressions ----

    fn project_expr(&mut self, expr: &AstExpr) -> Result<NodeId> {
        let pos = expr.pos();
        let (data, ty) = match expr {
            AstExpr::Annotation(a) => return self.project_annotation(a),
            AstExpr::ArrayAccess {
                array, index, ty, ..
            } => {
                let array = self.project_expr(array)?;
                let index = self.project_expr(index)?;
                (ExprData::ArrayAccess { array, index }, *ty)
            }
            AstExpr::Assign {
                operator,
                left,
                right,
                ty,
                ..
            } => {
                let left = self.project_expr(left)?;
                let right = self.project_expr(right)?;
                (
                    ExprData::Assignment {
                        operator: *operator,
                        left,
                        right,
                    },
                    *ty,
                )
            }
            AstExpr::ClassLiteral { component, ty, .. } => {
                let component = self.project_type_expr(component)?;
                (ExprData::ClassLiteral { component }, *ty)
            }
            AstExpr::Conditional {
                condition,
                true_expr,
                false_expr,
                ty,
                ..
            } => {
                let condition = self.project_expr(condition)?;
                let true_expr = self.project_expr(true_expr)?;
                let false_expr = self.project_expr(false_expr)?;
                (
                    ExprData::Conditional {
                        condition,
                        true_expr,
                        false_expr,
                    },
                    *ty,
                )
            }
            AstExpr::Erroneous { errors, .. } => {
                let mut out = Vec::new();
                for error in errors {
                    out.push(self.project_expr(error)?);
                }
                (ExprData::Erroneous { errors: out }, TypeId::NONE)
            }
            AstExpr::FieldAccess {
                object,
                member,
                symbol,
                ty,
                ..
            } => {
                let left = self.project_expr(object)?;
                let right = self.project_expr(member)?;
                if symbol.is_some() {
                    if let NodeData::Expr(ExprNode {
                        data: ExprData::Identifier { .. },
                        ..
                    }) = &self.graph.node(right)?.data
                    {
                        self.maps.refs.identifiers.insert(right, *symbol);
                        self.record_member_usage(*symbol);
                    }
                }
                (ExprData::FieldAccess { left, right }, *ty)
            }
            AstExpr::Identifier { name, ty, .. } => (
                ExprData::Identifier {
                    name: name.clone(),
                    refers_to: NodeId::NONE,
                },
                *ty,
            ),
            AstExpr::Infix {
                operator,
                left,
                right,
                ty,
                ..
            } => {
                let left = self.project_expr(left)?;
                let right = self.project_expr(right)?;
                (
                    ExprData::Infix {
                        operator: *operator,
                        left,
                        right,
                    },
                    *ty,
                )
            }
            AstExpr::InstanceOf {
                expr,
                test_type,
                ty,
                ..
            } => {
                let operand = self.project_expr(expr)?;
                let type_operand = self.project_type_expr(test_type)?;
                (
                    ExprData::InstanceOf {
                        operand,
                        type_operand,
                    },
                    *ty,
                )
            }
            AstExpr::Lambda {
                params, body, ty, ..
            } => {
                let mut parameters = Vec::new();
                for param in params {
                    parameters.push(self.project_var_decl(param, VarShape::Parameter)?);
                }
                let body = match body.as_ref() {
                    AstLambdaBody::Expr(e) => self.project_expr(e)?,
                    AstLambdaBody::Block(b) => self.project_stmt(b)?,
                };
                (
                    ExprData::Lambda {
                        parameters,
                        body,
                        lloc: 0,
                    },
                    *ty,
                )
            }
            AstExpr::Literal {
                value, text, ty, ..
            } => {
                let value = match value {
                    AstLiteral::Bool(v) => semgraph_core::graph::LiteralValue::Boolean(*v),
                    AstLiteral::Char(v) => semgraph_core::graph::LiteralValue::Character(*v),
                    AstLiteral::Int(v) => semgraph_core::graph::LiteralValue::Integer(*v),
                    AstLiteral::Float(v) => semgraph_core::graph::LiteralValue::Floating(*v),
                    AstLiteral::Str => {
                        semgraph_core::graph::LiteralValue::Str(text.clone())
                    }
                    AstLiteral::Null => semgraph_core::graph::LiteralValue::Null,
                };
                (
                    ExprData::Literal {
                        value,
                        text: text.clone(),
                    },
                    *ty,
                )
            }
            AstExpr::MemberReference {
                mode,
                qualifier,
                name,
                type_args,
                symbol,
                ty,
                ..
            } => {
                if symbol.is_some() {
                    self.record_member_usage(*symbol);
                }
                let qualifier = self.project_expr(qualifier)?;
                let mut type_arguments = Vec::new();
                for arg in type_args {
                    type_arguments.push(self.project_type_expr(arg)?);
                }
                (
                    ExprData::MemberReference {
                        mode: *mode,
                        qualifier,
                        name: name.clone(),
                        type_arguments,
                        refers_to: NodeId::NONE,
                    },
                    *ty,
                )
            }
            AstExpr::MethodInvocation {
                callee,
                type_args,
                args,
                ty,
                ..
            } => {
                let mut arguments = Vec::new();
                for arg in args {
                    arguments.push(self.project_expr(arg)?);
                }
                let mut type_arguments = Vec::new();
                for arg in type_args {
                    type_arguments.push(self.project_type_expr(arg)?);
                }
                let operand = self.project_expr(callee)?;
                (
                    ExprData::MethodInvocation {
                        operand,
                        type_arguments,
                        arguments,
                        invokes: NodeId::NONE,
                    },
                    *ty,
                )
            }
            AstExpr::NewArray {
                component,
                dims,
                init,
                ty,
                ..
            } => {
                let component_type = match component {
                    Some(c) => self.project_type_expr(c)?,
                    None => NodeId::NONE,
                };
                let mut dimensions = Vec::new();
                for dim in dims {
                    dimensions.push(self.project_expr(dim)?);
                }
                let mut initializers = Vec::new();
                for i in init {
                    initializers.push(self.project_expr(i)?);
                }
                (
                    ExprData::NewArray {
                        component_type,
                        dimensions,
                        initializers,
                    },
                    *ty,
                )
            }
            AstExpr::NewClass {
                enclosing,
                type_name,
                type_args,
                args,
                anonymous_body,
                ty,
                ..
            } => {
                let enclosing = match enclosing {
                    Some(e) => self.project_expr(e)?,
                    None => NodeId::NONE,
                };
                let type_name = self.project_type_expr(type_name)?;
                let mut type_arguments = Vec::new();
                for arg in type_args {
                    type_arguments.push(self.project_type_expr(arg)?);
                }
                let mut arguments = Vec::new();
                for arg in args {
                    arguments.push(self.project_expr(arg)?);
                }
                let anonymous_class = match anonymous_body {
                    Some(body) => self.project_type_decl(body, true)?,
                    None => NodeId::NONE,
                };
                (
                    ExprData::NewClass {
                        enclosing,
                        type_name,
                        type_arguments,
                        arguments,
                        anonymous_class,
                        constructor: NodeId::NONE,
                    },
                    *ty,
                )
            }
            AstExpr::Paren { expr, ty, .. } => {
                let operand = self.project_expr(expr)?;
                (ExprData::Paren { operand }, *ty)
            }
            AstExpr::Postfix {
                operator,
                operand,
                ty,
                ..
            } => {
                let operand = self.project_expr(operand)?;
                (
                    ExprData::Postfix {
                        operator: *operator,
                        operand,
                    },
                    *ty,
                )
            }
            AstExpr::Prefix {
                operator,
                operand,
                ty,
                ..
            } => {
                let operand = self.project_expr(operand)?;
                (
                    ExprData::Prefix {
                        operator: *operator,
                        operand,
                    },
                    *ty,
                )
            }
            AstExpr::Super { ty, .. } => (ExprData::Super, *ty),
            AstExpr::This { ty, .. } => (ExprData::This, *ty),
            AstExpr::TypeCast {
                target, expr, ty, ..
            } => {
                let type_operand = self.project_type_expr(target)?;
                let operand = self.project_expr(expr)?;
                (
                    ExprData::TypeCast {
                        type_operand,
                        operand,
                    },
                    *ty,
                )
            }
        };

        let node = Node::new(NodeData::Expr(ExprNode {
            ty: NodeId::NONE,
            data,
        }));
        let id = self.insert_at(node, Some(pos))?;
        self.maps.refs.record_type_use(ty, id);

        // Reference worklist entries keyed by the finished node id.
        match expr {
            AstExpr::Identifier { symbol, .. } if symbol.is_some() => {
                self.maps.refs.identifiers.insert(id, *symbol);
                self.record_member_usage(*symbol);
            }
            AstExpr::MethodInvocation { symbol, callee, .. } if symbol.is_some() => {
                self.maps.refs.invocations.insert(id, *symbol);
                self.record_member_usage(*symbol);
                if is_constructor_chain_callee(callee) {
                    if let Some(info) = self.model.try_symbol(*symbol) {
                        self.maps.closure.full_build.insert(info.owner);
                    }
                }
            }
            AstExpr::NewClass { constructor, .. } if constructor.is_some() => {
                self.maps.refs.constructions.insert(id, *constructor);
                if let Some(info) = self.model.try_symbol(*constructor) {
                    self.maps.closure.full_build.insert(info.owner);
                }
            }
            AstExpr::MemberReference { symbol, .. } if symbol.is_some() => {
                self.maps.refs.member_refs.insert(id, *symbol);
            }
            _ => {}
        }
        Ok(id)
    }

    // ---- type expressions ----

    fn project_type_expr(&mut self, expr: &AstTypeExpr) -> Result<NodeId> {
        let pos = expr.pos();
        let ty = expr.ty();
        let data = match expr {
            AstTypeExpr::Simple { name, symbol, .. } => {
                self.record_type_usage(*symbol);
                ExprData::SimpleTypeExpr { name: name.clone() }
            }
            AstTypeExpr::Qualified {
                qualifier,
                name,
                symbol,
                name_span,
                ..
            } => {
                let qualifier_id = self.project_type_expr(qualifier)?;
                let mut simple = Node::new(NodeData::Expr(ExprNode {
                    ty: NodeId::NONE,
                    data: ExprData::SimpleTypeExpr { name: name.clone() },
                }));
                if let Some(span) = self.opt_span(*name_span) {
                    simple.span = Some(span);
                } else if self.generated_depth > 0 {
                    simple.compiler_generated = true;
                }
                let simple_id = self.graph.insert(simple)?;
                self.maps.refs.record_type_use(ty, simple_id);
                self.record_type_usage(*symbol);
                ExprData::QualifiedTypeExpr {
                    qualifier: qualifier_id,
                    simple: simple_id,
                }
            }
            AstTypeExpr::Primitive { kind, .. } => ExprData::PrimitiveTypeExpr { kind: *kind },
            AstTypeExpr::Array { component, .. } => {
                let component = self.project_type_expr(component)?;
                ExprData::ArrayTypeExpr { component }
            }
            AstTypeExpr::Apply { raw, args, .. } => {
                let raw = self.project_type_expr(raw)?;
                let mut type_arguments = Vec::new();
                for arg in args {
                    type_arguments.push(self.project_type_expr(arg)?);
                }
                ExprData::TypeApplyExpr {
                    raw,
                    type_arguments,
                }
            }
            AstTypeExpr::Union { alternatives, .. } => {
                let mut out = Vec::new();
                for alternative in alternatives {
                    out.push(self.project_type_expr(alternative)?);
                }
                ExprData::TypeUnionExpr { alternatives: out }
            }
            AstTypeExpr::Wildcard {
                bound_kind, bound, ..
            } => {
                let bound = match bound {
                    Some(b) => self.project_type_expr(b)?,
                    None => NodeId::NONE,
                };
                ExprData::WildcardExpr {
                    bound_kind: *bound_kind,
                    bound,
                }
            }
            AstTypeExpr::Erroneous { .. } => ExprData::ErroneousTypeExpr { errors: Vec::new() },
        };

        let node = Node::new(NodeData::Expr(ExprNode {
            ty: NodeId::NONE,
            data,
        }));
        let id = self.insert_at(node, Some(pos))?;
        self.maps.refs.record_type_use(ty, id);
        Ok(id)
    }

    /// A type reference present only in the semantic model (implicit
    /// superclass and the like): a synthesized simple type expression.
    fn synthesized_type_expr(&mut self, ty: TypeId) -> Result<NodeId> {
        let symbol = self.model.declared_symbol(ty).unwrap_or(SymbolId::NONE);
        let data = match self.model.try_symbol(symbol) {
            Some(info) => {
                self.record_type_usage(symbol);
                ExprData::SimpleTypeExpr {
                    name: info.name.clone(),
                }
            }
            None => ExprData::ErroneousTypeExpr { errors: Vec::new() },
        };
        let mut node = Node::new(NodeData::Expr(ExprNode {
            ty: NodeId::NONE,
            data,
        }));
        node.compiler_generated = true;
        let id = self.graph.insert(node)?;
        self.maps.refs.record_type_use(ty, id);
        Ok(id)
    }

    // ---- worklist recording ----

    /// A class or interface was referenced: it must exist at least as a
    /// signature-only declaration after the closure.
    fn record_type_usage(&mut self, sym: SymbolId) {
        let Some(info) = self.model.try_symbol(sym) else {
            return;
        };
        if info.kind.is_class_like() && !info.flags.is_placeholder {
            self.maps.closure.usage_set.insert(sym);
        }
    }

    /// A member was referenced: its owner needs a full member list so the
    /// resolver can find the declaration.
    fn record_member_usage(&mut self, sym: SymbolId) {
        let Some(info) = self.model.try_symbol(sym) else {
            return;
        };
        if info.kind.is_class_like() {
            self.maps.closure.usage_set.insert(sym);
            return;
        }
        let Some(owner) = self.model.try_symbol(info.owner) else {
            return;
        };
        if owner.kind.is_class_like() {
            self.maps.closure.usage_set.insert(info.owner);
            self.maps.closure.full_build.insert(info.owner);
        }
    }
}

fn single_element_argument(arg: &AstExpr) -> bool {
    match arg {
        // A synthesized `value = <expr>` wrapper collapses to its value; the
        // oracle marks it by giving both sides the same position.
        AstExpr::Assign { left, right, .. } => left.pos().narrow == right.pos().narrow,
        _ => true,
    }
}

fn is_constructor_chain_callee(callee: &AstExpr) -> bool {
    matches!(callee, AstExpr::Identifier { name, .. } if name == "super" || name == "this")
}

/// Creates (or finds) the package node chain for `sym`, deduplicated by
/// symbol so repeated references across units converge on one node.
pub fn ensure_package_chain(
    graph: &mut Graph,
    maps: &mut SymbolMaps,
    model: &SemanticModel,
    sym: SymbolId,
) -> Result<NodeId> {
    if let Some(&id) = maps.decls.packages.get(&sym) {
        return Ok(id);
    }
    let info = model.symbol(sym)?;

    let (name, qualified) = if info.name.is_empty() {
        ("unnamed package".into(), "unnamed package".into())
    } else {
        (
            info.name.clone(),
            if info.qualified_name.is_empty() {
                info.name.clone()
            } else {
                info.qualified_name.clone()
            },
        )
    };
    let node = Node::new(NodeData::Package(PackageNode {
        name,
        qualified_name: qualified,
        annotations: Vec::new(),
        members: Vec::new(),
        compilation_units: Vec::new(),
    }));
    let id = graph.insert(node)?;
    maps.decls.packages.insert(sym, id);

    let parent = match model.try_symbol(info.owner) {
        Some(owner) if owner.kind == crate::oracle::SymbolKind::Package && !owner.name.is_empty() => {
            ensure_package_chain(graph, maps, model, info.owner)?
        }
        _ => graph.root(),
    };
    graph.add_member(parent, id)?;
    Ok(id)
}

/// Transitively marks every ancestor of `sym` for a full member build so
/// override edges can be computed against materialized declarations.
pub fn add_parents_to_full_build(model: &SemanticModel, maps: &mut SymbolMaps, sym: SymbolId) {
    let mut stack = vec![sym];
    let mut seen = IndexSet::new();
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        let Some(info) = model.try_symbol(current) else {
            continue;
        };
        if current != sym && info.kind.is_class_like() && !info.flags.is_placeholder {
            maps.closure.full_build.insert(current);
        }
        for ty in std::iter::once(info.superclass).chain(info.interfaces.iter().copied()) {
            if let Some(ancestor) = model.declared_symbol(ty) {
                stack.push(ancestor);
            }
        }
    }
}
