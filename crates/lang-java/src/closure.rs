//! External closure: materializes every externally-referenced declaration to
//! a fixed point.
//!
//! Resolving one reference may require a declaration that was never part of
//! the projected tree (a superclass defined outside the analyzed set, the
//! owner of an inherited member). Two work sets alternate between rounds so
//! that processing the current round can enqueue new symbols without
//! invalidating the iteration; the loop ends when a round adds nothing.
//! Convergence is guaranteed because a round only ever adds symbols not
//! already in the closure and the super/interface lattice of a finite tree
//! is finite.

use crate::config::BuildOptions;
use crate::error::Result;
use crate::maps::SymbolMaps;
use crate::oracle::{SemanticModel, SymbolId, SymbolKind, TypeId};
use crate::project::{add_parents_to_full_build, ensure_package_chain};
use indexmap::{IndexMap, IndexSet};
use semgraph_core::graph::{
    DeclData, DeclNode, ExprData, ExprNode, Graph, MethodData, MethodKind, Node, NodeData, NodeId,
    TypeDeclData, TypeShape, VarShape, VariableData,
};

pub struct ClosureBuilder<'a> {
    graph: &'a mut Graph,
    maps: &'a mut SymbolMaps,
    model: &'a SemanticModel,
    options: &'a BuildOptions,
    /// Symbols enqueued for the following round.
    next: IndexSet<SymbolId>,
    /// Every symbol that entered the closure, across all rounds.
    scheduled: IndexSet<SymbolId>,
    /// Declarations already materialized, by symbol identity.
    built: IndexMap<SymbolId, NodeId>,
    /// Built with signature and supertypes only; a later full-build request
    /// fills in the member list.
    partial: IndexSet<SymbolId>,
    /// Memoized owner hierarchy nodes.
    owner_cache: IndexMap<SymbolId, NodeId>,
}

impl<'a> ClosureBuilder<'a> {
    pub fn new(
        graph: &'a mut Graph,
        maps: &'a mut SymbolMaps,
        model: &'a SemanticModel,
        options: &'a BuildOptions,
    ) -> Self {
        Self {
            graph,
            maps,
            model,
            options,
            next: IndexSet::new(),
            scheduled: IndexSet::new(),
            built: IndexMap::new(),
            partial: IndexSet::new(),
            owner_cache: IndexMap::new(),
        }
    }

    pub fn build(mut self) -> Result<()> {
        // Seed: referenced classes/interfaces that were not projected from
        // an analyzed unit.
        let mut current: IndexSet<SymbolId> = self
            .maps
            .closure
            .usage_set
            .iter()
            .copied()
            .filter(|sym| !self.maps.decls.inner_types.contains_key(sym))
            .collect();

        let mut round = 0u32;
        while !current.is_empty() {
            round += 1;
            tracing::info!(round, pending = current.len(), "closure round");
            self.scheduled.extend(current.iter().copied());

            for sym in current {
                if self.model.is_skippable(sym) {
                    tracing::debug!(sym = sym.0, "skipping placeholder symbol");
                    continue;
                }
                // Ordering cycle: a symbol whose owner is itself scheduled
                // for a full build gets created as part of the owner.
                let owner = self.model.symbol(sym)?.owner;
                if self.scheduled.contains(&owner)
                    && self.maps.closure.full_build.contains(&owner)
                {
                    self.next.insert(owner);
                    continue;
                }

                let id = self.visit_symbol(sym)?;
                if id.is_some() && self.graph.node(id)?.parent.is_none() {
                    let parent = self.ensure_owner(owner)?;
                    self.graph.add_member(parent, id)?;
                }
            }

            current = std::mem::take(&mut self.next)
                .into_iter()
                .filter(|sym| {
                    !self.built.contains_key(sym) || self.partial.contains(sym)
                })
                .collect();
        }

        self.build_enum_functions()
    }

    /// The synthesized `values`/`valueOf` members of projected enums only
    /// exist in symbol form; they are filled in after the fixed point.
    fn build_enum_functions(&mut self) -> Result<()> {
        for (sym, enum_node) in self.maps.closure.enum_functions.clone() {
            let id = self.visit_symbol(sym)?;
            if id.is_none() {
                continue;
            }
            for node in self.graph.subtree(id)? {
                self.graph.node_mut(node)?.compiler_generated = true;
            }
            if self.graph.node(id)?.parent.is_none() {
                self.graph.add_member(enum_node, id)?;
            }
        }
        Ok(())
    }

    fn visit_symbol(&mut self, sym: SymbolId) -> Result<NodeId> {
        let info = self.model.symbol(sym)?.clone();
        match info.kind {
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Enum
            | SymbolKind::AnnotationType => {
                let full = self.maps.closure.full_build.contains(&sym);
                self.create_class(sym, full)
            }
            SymbolKind::Field | SymbolKind::EnumConstant | SymbolKind::Parameter => {
                let shape = match info.kind {
                    SymbolKind::Field => VarShape::Field,
                    SymbolKind::EnumConstant => VarShape::EnumConstant,
                    _ => VarShape::Parameter,
                };
                let var_type = self.type_expression(info.ty)?;
                let node = Node::new(NodeData::Decl(DeclNode {
                    name: info.name.clone(),
                    name_span: None,
                    modifiers: info.modifiers,
                    annotations: Vec::new(),
                    data: DeclData::Variable(VariableData {
                        shape,
                        var_type,
                        init: NodeId::NONE,
                    }),
                }));
                let id = self.graph.insert(node)?;
                self.maps.decls.variables.insert(sym, id);
                if shape != VarShape::Parameter {
                    self.enqueue_type(info.ty);
                }
                Ok(id)
            }
            SymbolKind::Method | SymbolKind::Constructor => {
                let is_constructor = info.kind == SymbolKind::Constructor;
                let owner_is_annotation = self
                    .model
                    .try_symbol(info.owner)
                    .map(|o| o.kind == SymbolKind::AnnotationType)
                    .unwrap_or(false);

                let data = if owner_is_annotation {
                    let return_type = self.type_expression(info.return_type)?;
                    DeclData::AnnotationElement {
                        return_type,
                        default_value: NodeId::NONE,
                        method_type: NodeId::NONE,
                    }
                } else {
                    let mut type_parameters = Vec::new();
                    for &tp in &info.type_params {
                        type_parameters.push(self.type_parameter(tp)?);
                    }
                    let mut thrown_exceptions = Vec::new();
                    for &thrown in &info.thrown {
                        thrown_exceptions.push(self.type_expression(thrown)?);
                    }
                    let mut parameters = Vec::new();
                    for &param in &info.params {
                        parameters.push(self.visit_symbol(param)?);
                    }
                    let return_type = if is_constructor {
                        NodeId::NONE
                    } else {
                        self.type_expression(info.return_type)?
                    };
                    DeclData::Method(MethodData {
                        is_generic: !info.type_params.is_empty(),
                        method_kind: if is_constructor {
                            MethodKind::Constructor
                        } else {
                            MethodKind::Normal
                        },
                        type_parameters,
                        parameters,
                        return_type,
                        thrown_exceptions,
                        body: NodeId::NONE,
                        method_type: NodeId::NONE,
                        overrides: NodeId::NONE,
                        lloc: 0,
                    })
                };

                // Constructors carry the owner's name.
                let name = if is_constructor {
                    self.model
                        .try_symbol(info.owner)
                        .map(|o| o.name.clone())
                        .unwrap_or_else(|| info.name.clone())
                } else {
                    info.name.clone()
                };
                let node = Node::new(NodeData::Decl(DeclNode {
                    name,
                    name_span: None,
                    modifiers: info.modifiers,
                    annotations: Vec::new(),
                    data,
                }));
                let id = self.graph.insert(node)?;
                self.maps.decls.methods.insert(sym, id);
                self.maps.refs.record_type_use(info.ty, id);
                Ok(id)
            }
            SymbolKind::TypeParameter => self.type_parameter(info.ty),
            SymbolKind::Package => ensure_package_chain(self.graph, self.maps, self.model, sym),
            SymbolKind::StaticInit | SymbolKind::LocalVariable
            | SymbolKind::ExceptionParameter => {
                tracing::debug!(sym = sym.0, kind = ?info.kind, "symbol kind not built externally");
                Ok(NodeId::NONE)
            }
        }
    }

    fn create_class(&mut self, sym: SymbolId, full: bool) -> Result<NodeId> {
        if let Some(&id) = self.built.get(&sym) {
            // Fill in a partially built declaration when a full build is now
            // required for override soundness.
            if self.partial.contains(&sym) && full {
                self.partial.swap_remove(&sym);
                tracing::info!(sym = sym.0, "filling in external type declaration");
                let info = self.model.symbol(sym)?.clone();
                self.enqueue_type(info.superclass);
                for &interface in &info.interfaces {
                    self.enqueue_type(interface);
                }
                self.build_members(sym, id)?;
            }
            return Ok(id);
        }

        let info = self.model.symbol(sym)?.clone();
        tracing::info!(name = %info.qualified_name, "building external type declaration");

        let shape = match info.kind {
            SymbolKind::Class => TypeShape::Class,
            SymbolKind::Interface => TypeShape::Interface,
            SymbolKind::Enum => TypeShape::Enum,
            _ => TypeShape::Annotation,
        };
        let mut type_parameters = Vec::new();
        for &tp in &info.type_params {
            type_parameters.push(self.type_parameter(tp)?);
        }

        let superclass = if info.superclass.is_some() {
            self.enqueue_type(info.superclass);
            self.type_expression(info.superclass)?
        } else {
            NodeId::NONE
        };
        let mut super_interfaces = Vec::new();
        for &interface in &info.interfaces {
            self.enqueue_type(interface);
            super_interfaces.push(self.type_expression(interface)?);
        }

        let node = Node::new(NodeData::Decl(DeclNode {
            name: info.name.clone(),
            name_span: None,
            modifiers: info.modifiers,
            annotations: Vec::new(),
            data: DeclData::Type(TypeDeclData {
                shape,
                is_generic: !info.type_params.is_empty(),
                binary_name: info.binary_name.clone(),
                type_parameters,
                superclass,
                super_interfaces,
                members: Vec::new(),
                others: Vec::new(),
                in_compilation_unit: NodeId::NONE,
                lloc: 0,
            }),
        }));
        let id = self.graph.insert(node)?;
        self.built.insert(sym, id);
        self.maps.decls.external_types.insert(sym, id);

        if full || self.options.build_all_external {
            self.build_members(sym, id)?;
        } else {
            self.partial.insert(sym);
        }
        Ok(id)
    }

    fn build_members(&mut self, sym: SymbolId, type_node: NodeId) -> Result<()> {
        if self.options.build_parents_for_overrides {
            add_parents_to_full_build(self.model, self.maps, sym);
        }
        let members = self.model.symbol(sym)?.members.clone();
        for member in members {
            let Some(info) = self.model.try_symbol(member) else {
                continue;
            };
            // Static initializer symbols carry nothing useful.
            if info.kind == SymbolKind::StaticInit {
                continue;
            }
            let id = self.visit_symbol(member)?;
            if id.is_some() && self.graph.node(id)?.parent.is_none() {
                self.graph.add_member(type_node, id)?;
            }
        }
        Ok(())
    }

    fn type_parameter(&mut self, ty: TypeId) -> Result<NodeId> {
        if let Some(&id) = self.maps.decls.type_params.get(&ty) {
            return Ok(id);
        }
        let name = match self.model.try_ty(ty) {
            Some(crate::oracle::TypeEntry::Variable { name, .. }) => name.clone(),
            _ => "?".into(),
        };
        let node = Node::new(NodeData::Decl(DeclNode {
            name,
            name_span: None,
            modifiers: Default::default(),
            annotations: Vec::new(),
            data: DeclData::TypeParameter { bounds: Vec::new() },
        }));
        let id = self.graph.insert(node)?;
        self.maps.decls.type_params.insert(ty, id);
        Ok(id)
    }

    /// Stand-in type expression for a symbol-derived type reference; also
    /// feeds the type graph builder and enqueues referenced declarations.
    fn type_expression(&mut self, ty: TypeId) -> Result<NodeId> {
        if ty.is_none() {
            return Ok(NodeId::NONE);
        }
        let node = Node::new(NodeData::Expr(ExprNode {
            ty: NodeId::NONE,
            data: ExprData::ExternalTypeExpr,
        }));
        let id = self.graph.insert(node)?;
        self.maps.refs.record_type_use(ty, id);
        self.enqueue_type(ty);
        Ok(id)
    }

    /// Schedules the declarations a type value mentions for the next round.
    fn enqueue_type(&mut self, ty: TypeId) {
        use crate::oracle::TypeEntry::*;
        match self.model.try_ty(ty) {
            Some(Declared { symbol, args, .. }) => {
                self.enqueue(*symbol);
                for &arg in args {
                    self.enqueue_type(arg);
                }
            }
            Some(Array { elem, .. }) => self.enqueue_type(*elem),
            Some(Wildcard { bound, .. }) => self.enqueue_type(*bound),
            Some(Union { alternatives }) => {
                for &alt in alternatives {
                    self.enqueue_type(alt);
                }
            }
            _ => {}
        }
    }

    fn enqueue(&mut self, sym: SymbolId) {
        if self.model.is_skippable(sym) {
            return;
        }
        let Some(info) = self.model.try_symbol(sym) else {
            return;
        };
        if !info.kind.is_class_like() {
            return;
        }
        if self.maps.decls.inner_types.contains_key(&sym) {
            return;
        }
        if self.built.contains_key(&sym) && !self.partial.contains(&sym) {
            return;
        }
        self.next.insert(sym);
    }

    fn ensure_owner(&mut self, owner: SymbolId) -> Result<NodeId> {
        if owner.is_none() {
            return Ok(self.graph.root());
        }
        if let Some(&id) = self.owner_cache.get(&owner) {
            return Ok(id);
        }
        let info = self.model.symbol(owner)?.clone();
        let id = match info.kind {
            SymbolKind::Package => {
                ensure_package_chain(self.graph, self.maps, self.model, owner)?
            }
            kind if kind.is_class_like() => {
                // A projected owner already sits in the tree.
                if let Some(id) = self.maps.decls.type_decl(owner) {
                    id
                } else {
                    let full = self.maps.closure.full_build.contains(&owner);
                    let id = self.create_class(owner, full)?;
                    if self.graph.node(id)?.parent.is_none() {
                        let parent = self.ensure_owner(info.owner)?;
                        self.graph.add_member(parent, id)?;
                    }
                    id
                }
            }
            _ => self.graph.root(),
        };
        self.owner_cache.insert(owner, id);
        Ok(id)
    }
}
