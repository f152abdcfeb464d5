//! Cross-edge resolution: invocations, constructions, identifiers, member
//! references, override edges and jump targets.
//!
//! Each worklist entry first tries a direct declaration-map hit. A miss on a
//! member reference falls back to the name-based ancestor walk: the owner's
//! superclass chain first, then every implemented/extended interface, each
//! visited at most once, first match wins. Downstream consumers depend on
//! that exact precedence, so it is preserved as documented rather than
//! "improved". Unresolvable targets are soundness gaps: recorded and left
//! unset, never fatal.

use crate::error::Result;
use crate::maps::SymbolMaps;
use crate::oracle::{SemanticModel, SymbolId, SymbolKind};
use indexmap::IndexSet;
use semgraph_core::diagnostics::{Diagnostic, Diagnostics};
use semgraph_core::graph::{
    BaseKind, DeclData, DeclNode, Graph, MethodKind, NodeData, NodeId, StmtNode,
};

pub struct CrossEdgeResolver<'a> {
    graph: &'a mut Graph,
    maps: &'a SymbolMaps,
    model: &'a SemanticModel,
    diags: &'a mut Diagnostics,
}

impl<'a> CrossEdgeResolver<'a> {
    pub fn new(
        graph: &'a mut Graph,
        maps: &'a SymbolMaps,
        model: &'a SemanticModel,
        diags: &'a mut Diagnostics,
    ) -> Self {
        Self {
            graph,
            maps,
            model,
            diags,
        }
    }

    pub fn resolve(&mut self) -> Result<()> {
        self.resolve_invocations()?;
        self.resolve_constructions()?;
        self.resolve_identifiers()?;
        self.resolve_member_references()?;
        self.resolve_overrides()?;
        self.resolve_jumps()?;
        Ok(())
    }

    fn resolve_invocations(&mut self) -> Result<()> {
        for (&node, &sym) in &self.maps.refs.invocations {
            let target = self
                .maps
                .decls
                .methods
                .get(&sym)
                .copied()
                .or_else(|| self.inherited_member_node(sym));
            match target {
                Some(method) => self.graph.set_invocation_target(node, method)?,
                None => self.report_unresolved(node, "invocation", sym),
            }
        }
        Ok(())
    }

    fn resolve_constructions(&mut self) -> Result<()> {
        for (&node, &sym) in &self.maps.refs.constructions {
            match self.maps.decls.methods.get(&sym) {
                Some(&ctor) => self.graph.set_constructor(node, ctor)?,
                None => self.report_unresolved(node, "construction", sym),
            }
        }
        Ok(())
    }

    fn resolve_identifiers(&mut self) -> Result<()> {
        for (&node, &sym) in &self.maps.refs.identifiers {
            match self.identifier_target(sym) {
                Some(decl) => self.graph.set_identifier_target(node, decl)?,
                None => self.report_unresolved(node, "identifier", sym),
            }
        }
        Ok(())
    }

    fn resolve_member_references(&mut self) -> Result<()> {
        for (&node, &sym) in &self.maps.refs.member_refs {
            let target = self
                .maps
                .decls
                .methods
                .get(&sym)
                .copied()
                .or_else(|| self.inherited_member_node(sym));
            match target {
                Some(method) => self.graph.set_identifier_target(node, method)?,
                None => self.report_unresolved(node, "member reference", sym),
            }
        }
        Ok(())
    }

    fn identifier_target(&self, sym: SymbolId) -> Option<NodeId> {
        let info = self.model.try_symbol(sym)?;
        let direct = if info.kind.is_variable_like() {
            self.maps.decls.variables.get(&sym).copied()
        } else if info.kind.is_method_like() {
            self.maps.decls.methods.get(&sym).copied()
        } else if info.kind.is_class_like() {
            self.maps.decls.type_decl(sym)
        } else if info.kind == SymbolKind::Package {
            self.maps.decls.packages.get(&sym).copied()
        } else if info.kind == SymbolKind::TypeParameter {
            self.maps.decls.type_params.get(&info.ty).copied()
        } else {
            None
        };
        direct.or_else(|| self.inherited_member_node(sym))
    }

    /// The name-based ancestor walk: common for inherited members never
    /// redeclared in the referenced owner.
    fn inherited_member_node(&self, sym: SymbolId) -> Option<NodeId> {
        let matched = self.find_in_ancestors(sym)?;
        let info = self.model.try_symbol(matched)?;
        if info.kind.is_method_like() {
            self.maps.decls.methods.get(&matched).copied()
        } else if info.kind.is_variable_like() {
            self.maps.decls.variables.get(&matched).copied()
        } else {
            self.maps.decls.type_decl(matched)
        }
    }

    fn find_in_ancestors(&self, sym: SymbolId) -> Option<SymbolId> {
        let info = self.model.try_symbol(sym)?;
        for ancestor in self.ancestors_of(info.owner) {
            let Some(ancestor_info) = self.model.try_symbol(ancestor) else {
                continue;
            };
            for &member in &ancestor_info.members {
                if member == sym {
                    continue;
                }
                let Some(candidate) = self.model.try_symbol(member) else {
                    continue;
                };
                if candidate.name != info.name {
                    continue;
                }
                let signatures_match = if info.kind.is_method_like() {
                    candidate.erased_signature == info.erased_signature
                } else {
                    candidate.kind == info.kind
                };
                if signatures_match {
                    return Some(member);
                }
            }
        }
        None
    }

    /// Ancestors of `owner` in resolution order: the superclass chain,
    /// nearest first, then the interface lattice in declaration order with a
    /// visited-set (interface lattices can re-converge).
    fn ancestors_of(&self, owner: SymbolId) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        let mut interface_queue = Vec::new();
        let mut cursor = owner;
        let mut guard = 0;
        while cursor.is_some() && guard < 1024 {
            guard += 1;
            let Some(info) = self.model.try_symbol(cursor) else {
                break;
            };
            interface_queue.extend(
                info.interfaces
                    .iter()
                    .filter_map(|&ty| self.model.declared_symbol(ty)),
            );
            if cursor != owner {
                chain.push(cursor);
            }
            let superclass = self
                .model
                .declared_symbol(info.superclass)
                .unwrap_or(SymbolId::NONE);
            if superclass.is_none() {
                break;
            }
            cursor = superclass;
        }

        let mut visited: IndexSet<SymbolId> = IndexSet::new();
        let mut queue = std::collections::VecDeque::from(interface_queue);
        while let Some(interface) = queue.pop_front() {
            if !visited.insert(interface) {
                continue;
            }
            chain.push(interface);
            if let Some(info) = self.model.try_symbol(interface) {
                queue.extend(
                    info.interfaces
                        .iter()
                        .filter_map(|&ty| self.model.declared_symbol(ty)),
                );
            }
        }
        chain
    }

    /// Override edges: per declared method the same ancestor walk, using the
    /// oracle's compatibility predicate, recording only the nearest match.
    /// Class ancestry takes precedence over interface ancestry.
    fn resolve_overrides(&mut self) -> Result<()> {
        for (&sym, &node) in &self.maps.decls.methods {
            let Some(info) = self.model.try_symbol(sym) else {
                continue;
            };
            if info.kind != SymbolKind::Method {
                continue;
            }
            if let NodeData::Decl(DeclNode {
                data: DeclData::Method(m),
                ..
            }) = &self.graph.node(node)?.data
            {
                if m.method_kind == MethodKind::Constructor {
                    continue;
                }
            }
            let Some(owner) = self.model.try_symbol(info.owner) else {
                continue;
            };
            if !owner.kind.is_class_like() {
                continue;
            }

            let mut found = None;
            'walk: for ancestor in self.ancestors_of(info.owner) {
                let Some(ancestor_info) = self.model.try_symbol(ancestor) else {
                    continue;
                };
                for &member in &ancestor_info.members {
                    if self.model.is_override_compatible(sym, member) {
                        found = Some(member);
                        break 'walk;
                    }
                }
            }

            if let Some(overridden) = found {
                match self.maps.decls.methods.get(&overridden) {
                    Some(&target) => self.graph.set_override_target(node, target)?,
                    // Never materialized (declaration soundness off for this
                    // ancestor): the edge is omitted rather than forcing
                    // construction.
                    None => self.diags.report(Diagnostic::MissingOverrideTarget {
                        method: node,
                        target: self
                            .model
                            .try_symbol(overridden)
                            .map(|m| m.qualified_name.clone())
                            .unwrap_or_default(),
                    }),
                }
            }
        }
        Ok(())
    }

    /// Jump resolution: the physical parent chain up to a matching label or
    /// the nearest enclosing loop/switch. Leaving the enclosing body without
    /// a target is a soundness gap, not an error.
    fn resolve_jumps(&mut self) -> Result<()> {
        for &jump in &self.maps.refs.jumps {
            let (label, is_continue) = match &self.graph.node(jump)?.data {
                NodeData::Stmt(StmtNode::Break { label, .. }) => (label.clone(), false),
                NodeData::Stmt(StmtNode::Continue { label, .. }) => (label.clone(), true),
                _ => continue,
            };

            let mut target = None;
            let mut cursor = self.graph.node(jump)?.parent;
            while cursor.is_some() {
                let node = self.graph.node(cursor)?;
                let kind = node.kind();
                // A jump never leaves its enclosing body.
                if kind.is_a(BaseKind::Declaration) || kind == semgraph_core::graph::NodeKind::Lambda
                {
                    break;
                }
                match (&label, &node.data) {
                    (Some(wanted), NodeData::Stmt(StmtNode::LabeledStatement { label, .. }))
                        if label == wanted =>
                    {
                        target = Some(cursor);
                        break;
                    }
                    (None, _)
                        if (is_continue && kind.is_continue_target())
                            || (!is_continue && kind.is_break_target()) =>
                    {
                        target = Some(cursor);
                        break;
                    }
                    _ => {}
                }
                cursor = node.parent;
            }

            match target {
                Some(target) => self.graph.set_jump_target(jump, target)?,
                None => self.diags.report(Diagnostic::UnresolvedJump { node: jump }),
            }
        }
        Ok(())
    }

    fn report_unresolved(&mut self, node: NodeId, category: &'static str, sym: SymbolId) {
        let symbol = self
            .model
            .try_symbol(sym)
            .map(|s| {
                if s.qualified_name.is_empty() {
                    s.name.clone()
                } else {
                    s.qualified_name.clone()
                }
            })
            .unwrap_or_default();
        self.diags.report(Diagnostic::UnresolvedReference {
            node,
            category,
            symbol,
        });
    }
}
