//! Declaration maps and reference worklists.
//!
//! Projection fills these; the closure builder, cross-edge resolver and type
//! graph builder drain them. Insertion order is iteration order, which keeps
//! closure rounds and resolution deterministic.

use crate::oracle::{SymbolId, TypeId};
use indexmap::{IndexMap, IndexSet};
use semgraph_core::graph::NodeId;

/// Symbol → node id, partitioned by declaration category.
#[derive(Debug, Default)]
pub struct DeclarationMaps {
    pub methods: IndexMap<SymbolId, NodeId>,
    /// Type declarations materialized by the closure builder.
    pub external_types: IndexMap<SymbolId, NodeId>,
    /// Type declarations projected from analyzed units.
    pub inner_types: IndexMap<SymbolId, NodeId>,
    pub variables: IndexMap<SymbolId, NodeId>,
    pub packages: IndexMap<SymbolId, NodeId>,
    /// Keyed by the type-variable type, the way type parameters are looked
    /// up during type building.
    pub type_params: IndexMap<TypeId, NodeId>,
}

impl DeclarationMaps {
    /// Looks a type declaration up in either partition.
    pub fn type_decl(&self, sym: SymbolId) -> Option<NodeId> {
        self.inner_types
            .get(&sym)
            .or_else(|| self.external_types.get(&sym))
            .copied()
    }
}

/// Node id → referenced symbol, one worklist per reference category, plus
/// the type-usage record drained by the type graph builder.
#[derive(Debug, Default)]
pub struct ReferenceWorklists {
    pub invocations: IndexMap<NodeId, SymbolId>,
    pub constructions: IndexMap<NodeId, SymbolId>,
    pub identifiers: IndexMap<NodeId, SymbolId>,
    pub member_refs: IndexMap<NodeId, SymbolId>,
    /// Type value → every node that uses it.
    pub type_uses: IndexMap<TypeId, Vec<NodeId>>,
    /// Break/continue nodes pending jump resolution.
    pub jumps: Vec<NodeId>,
}

impl ReferenceWorklists {
    pub fn record_type_use(&mut self, ty: TypeId, node: NodeId) {
        if ty.is_some() {
            self.type_uses.entry(ty).or_default().push(node);
        }
    }
}

/// Closure-builder inputs gathered during projection.
#[derive(Debug, Default)]
pub struct ClosureRequests {
    /// Externally referenced classes/interfaces that must exist at least in
    /// partial (signature) form.
    pub usage_set: IndexSet<SymbolId>,
    /// Symbols whose full member list is needed (override soundness,
    /// member access sites).
    pub full_build: IndexSet<SymbolId>,
    /// Synthesized enum lookup members (`values`, `valueOf`), keyed by the
    /// method symbol, pointing at the owning enum node.
    pub enum_functions: IndexMap<SymbolId, NodeId>,
}

/// Everything the pipeline stages share besides the graph itself.
#[derive(Debug, Default)]
pub struct SymbolMaps {
    pub decls: DeclarationMaps,
    pub refs: ReferenceWorklists,
    pub closure: ClosureRequests,
}
