//! Build options, passed by reference into each pipeline stage.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionMode {
    /// One output rooted at the synthetic root package.
    Merged,
    /// One output per top-level declaration, plus the shared "extra"
    /// partition for externals.
    PerDeclaration,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Attach the comment feed to the graph.
    pub keep_comments: bool,
    /// Materialize the full member list of every external declaration, not
    /// just the ones member accesses and overrides require.
    pub build_all_external: bool,
    /// Fully build every ancestor of an extending/implementing declaration
    /// so override edges stay sound.
    pub build_parents_for_overrides: bool,
    /// Run the structural checker after resolution.
    pub check: bool,
    pub partition: PartitionMode,
    /// Path of the merged graph file; the filter file lands next to it.
    pub output: Option<PathBuf>,
    /// Directory for per-declaration partitions.
    pub partition_dir: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            keep_comments: true,
            build_all_external: false,
            build_parents_for_overrides: true,
            check: false,
            partition: PartitionMode::Merged,
            output: None,
            partition_dir: None,
        }
    }
}
