//! Core semantic-graph model: the node arena, flyweight canonicalization,
//! filter mask, diagnostics and the persisted binary format.
//!
//! Language-side construction (projection, closure, resolution, type
//! building, comment attachment) lives in `semgraph-java`; this crate only
//! owns the shared graph itself.

pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod storage;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{GraphError, Result};
pub use graph::Graph;
