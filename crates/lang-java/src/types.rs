//! Type graph construction.
//!
//! Converts the oracle's semantic type values into canonical type nodes,
//! memoized by type identity, then back-fills the type edge of every usage
//! site. A second pass gives each type declaration its scope type so any
//! type can refer to its own declaring scope.

use crate::error::Result;
use crate::maps::SymbolMaps;
use crate::oracle::{SemanticModel, TypeEntry, TypeId};
use indexmap::IndexMap;
use semgraph_core::diagnostics::{Diagnostic, Diagnostics};
use semgraph_core::graph::{Graph, NodeId, NodeKind};

pub struct TypeGraphBuilder<'a> {
    graph: &'a mut Graph,
    maps: &'a mut SymbolMaps,
    model: &'a SemanticModel,
    diags: &'a mut Diagnostics,
    built: IndexMap<TypeId, NodeId>,
    scope_types: IndexMap<NodeId, NodeId>,
}

impl<'a> TypeGraphBuilder<'a> {
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
            built: IndexMap::new(),
            scope_types: IndexMap::new(),
        }
    }

    pub fn build(mut self) -> Result<()> {
        let uses = std::mem::take(&mut self.maps.refs.type_uses);
        for (ty, users) in &uses {
            let type_node = self.visit(*ty)?;
            if type_node.is_none() {
                tracing::debug!(ty = ty.0, "unknown type value");
                continue;
            }
            for &user in users {
                let existing = self.graph.node_type(user)?;
                if existing.is_none() {
                    self.graph.set_node_type(user, type_node)?;
                } else if existing != type_node {
                    self.diags.report(Diagnostic::ConflictingType {
                        node: user,
                        existing,
                        computed: type_node,
                    });
                }
            }
        }
        self.maps.refs.type_uses = uses;

        // One scope type per type declaration, memoized per declaration.
        let decls: Vec<NodeId> = self
            .graph
            .iter()
            .filter(|(_, node)| node.kind().is_type_declaration())
            .map(|(id, _)| id)
            .collect();
        for decl in decls {
            self.scope_type(decl)?;
        }
        Ok(())
    }

    fn visit(&mut self, ty: TypeId) -> Result<NodeId> {
        if ty.is_none() {
            return Ok(NodeId::NONE);
        }
        if let Some(&id) = self.built.get(&ty) {
            return Ok(id);
        }
        let entry = self.model.ty(ty)?.clone();
        let id = match entry {
            TypeEntry::Primitive { primitive } => self.graph.primitive_type(primitive),
            TypeEntry::Void => self.graph.void_type(),
            TypeEntry::Null => self.graph.null_type(),
            TypeEntry::None => self.graph.no_type(),
            TypeEntry::Error => self.graph.error_type(),
            TypeEntry::Array { elem, dims } => {
                let component = self.visit(elem)?;
                self.graph.array_type(dims, component)
            }
            TypeEntry::Declared {
                symbol,
                args,
                owner,
                erasure,
            } => {
                let owner_id = self.visit(owner)?;
                if args.is_empty() {
                    let refers_to = self.maps.decls.type_decl(symbol).unwrap_or_else(|| {
                        tracing::debug!(ty = ty.0, "declared type without a stored declaration");
                        NodeId::NONE
                    });
                    self.graph.class_type(owner_id, refers_to)
                } else {
                    let raw = if erasure.is_some() {
                        self.visit(erasure)?
                    } else {
                        let refers_to = self.maps.decls.type_decl(symbol).unwrap_or(NodeId::NONE);
                        self.graph.class_type(owner_id, refers_to)
                    };
                    let mut argument_ids = Vec::new();
                    for arg in args {
                        argument_ids.push(self.visit(arg)?);
                    }
                    self.graph.parameterized_type(owner_id, raw, argument_ids)
                }
            }
            TypeEntry::Wildcard { bound_kind, bound } => {
                let bound_id = self.visit(bound)?;
                self.graph.wildcard_type(bound_kind, bound_id)
            }
            TypeEntry::Variable { symbol, ref name } => {
                let refers_to = match self.maps.decls.type_params.get(&ty) {
                    Some(&id) => id,
                    // Captured or renamed variable: fall back to the owning
                    // generic declaration's parameter list, matched by name.
                    None => self.owner_type_param(symbol, name).unwrap_or_else(|| {
                        tracing::debug!(ty = ty.0, %name, "type parameter could not be found");
                        NodeId::NONE
                    }),
                };
                self.graph.type_variable(refers_to)
            }
            TypeEntry::Union { alternatives } => {
                let mut ids = Vec::new();
                for alt in alternatives {
                    ids.push(self.visit(alt)?);
                }
                self.graph.union_type(ids)
            }
            TypeEntry::Executable {
                return_type,
                params,
                thrown,
            } => {
                let return_id = self.visit(return_type)?;
                let mut param_ids = Vec::new();
                for param in params {
                    param_ids.push(self.visit(param)?);
                }
                let mut thrown_ids = Vec::new();
                for t in thrown {
                    thrown_ids.push(self.visit(t)?);
                }
                self.graph.method_type(return_id, param_ids, thrown_ids)
            }
            TypeEntry::Package { symbol } => {
                let refers_to = self.maps.decls.packages.get(&symbol).copied().unwrap_or_else(|| {
                    tracing::debug!(ty = ty.0, "package type without a stored package");
                    NodeId::NONE
                });
                self.graph.package_type(refers_to)
            }
        };
        self.built.insert(ty, id);
        Ok(id)
    }

    fn owner_type_param(
        &self,
        symbol: crate::oracle::SymbolId,
        name: &smol_str::SmolStr,
    ) -> Option<NodeId> {
        let owner = self.model.try_symbol(symbol)?.owner;
        let owner_info = self.model.try_symbol(owner)?;
        for &tp in &owner_info.type_params {
            if let Some(TypeEntry::Variable { name: tp_name, .. }) = self.model.try_ty(tp) {
                if tp_name == name {
                    return self.maps.decls.type_params.get(&tp).copied();
                }
            }
        }
        None
    }

    /// Scope type of a declaration or package: a class type whose owner is
    /// the enclosing scope's type, recursively.
    fn scope_type(&mut self, node: NodeId) -> Result<NodeId> {
        if let Some(&id) = self.scope_types.get(&node) {
            return Ok(id);
        }
        let kind = self.graph.node(node)?.kind();
        let id = if kind == NodeKind::Package {
            self.graph.package_type(node)
        } else if kind.is_type_declaration() {
            let mut owner = self.graph.node(node)?.parent;
            // The nearest enclosing type declaration or package.
            while owner.is_some() {
                let owner_kind = self.graph.node(owner)?.kind();
                if owner_kind.is_type_declaration() || owner_kind == NodeKind::Package {
                    break;
                }
                owner = self.graph.node(owner)?.parent;
            }
            let owner_type = if owner.is_some() {
                self.scope_type(owner)?
            } else {
                NodeId::NONE
            };
            self.graph.class_type(owner_type, node)
        } else {
            NodeId::NONE
        };
        self.scope_types.insert(node, id);
        Ok(id)
    }
}
