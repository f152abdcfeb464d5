//! Non-fatal findings collected while the graph is built.
//!
//! Soundness gaps (an override or jump target that cannot be found, an
//! ambiguous comment anchor) and duplicate-declaration anomalies do not stop
//! the run; they are recorded here and the edge in question is simply left
//! unset. Only oracle-consistency and I/O errors abort a build.

use crate::graph::NodeId;
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A reference worklist entry could not be resolved to a declaration.
    UnresolvedReference {
        node: NodeId,
        category: &'static str,
        symbol: SmolStr,
    },
    /// A compatible overridden method exists but was never materialized.
    MissingOverrideTarget { method: NodeId, target: SmolStr },
    /// A break/continue with no valid enclosing target.
    UnresolvedJump { node: NodeId },
    /// The same binary name was observed at two declaration sites.
    /// Both sites are kept in the graph.
    DuplicateBinaryName {
        name: SmolStr,
        first: NodeId,
        second: NodeId,
    },
    /// A node already carried a different type than the one computed for it.
    ConflictingType {
        node: NodeId,
        existing: NodeId,
        computed: NodeId,
    },
    /// Structural inconsistency found by the graph checker.
    CheckFailure { node: NodeId, message: SmolStr },
}

impl Diagnostic {
    pub fn node(&self) -> NodeId {
        match self {
            Diagnostic::UnresolvedReference { node, .. }
            | Diagnostic::UnresolvedJump { node }
            | Diagnostic::ConflictingType { node, .. }
            | Diagnostic::CheckFailure { node, .. } => *node,
            Diagnostic::MissingOverrideTarget { method, .. } => *method,
            Diagnostic::DuplicateBinaryName { second, .. } => *second,
        }
    }
}

/// Append-only diagnostic sink shared by the pipeline stages.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(?diagnostic, "soundness gap");
        self.items.push(diagnostic);
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Logs a one-line summary at the end of a run.
    pub fn log_summary(&self) {
        if self.items.is_empty() {
            return;
        }
        tracing::warn!(
            count = self.items.len(),
            "resolution finished with soundness gaps"
        );
    }
}
