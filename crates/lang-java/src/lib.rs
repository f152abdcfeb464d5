//! Semantic graph construction for Java-like sources.
//!
//! The front-end oracle parses, binds and type-checks; this crate turns its
//! output into a standalone node-and-edge graph: projection of the syntax
//! tree, fixed-point materialization of externally-referenced declarations,
//! comment attachment, cross-edge resolution, type graph construction, and
//! partitioned persistence.

pub mod check;
pub mod closure;
pub mod comments;
pub mod config;
pub mod error;
pub mod lloc;
pub mod maps;
pub mod oracle;
pub mod pipeline;
pub mod project;
pub mod resolve;
pub mod types;

pub use config::{BuildOptions, PartitionMode};
pub use error::{BuildError, Result};
pub use pipeline::{build_graph, save_outputs, BuildOutput};
