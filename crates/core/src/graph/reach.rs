//! Reachability filtering for partitioned output.
//!
//! A preorder walk from the partition roots marks every needed node; whatever
//! stays unmarked inside the pass's filter range is filtered node-by-node.
//! Member lists of packages and type declarations do not descend into the
//! external segment: externally materialized declarations are only kept when
//! a resolved reference or type edge actually reaches them, which is what
//! prunes compiled-in-but-unused external declarations per output unit.

use crate::error::Result;
use crate::graph::node::{DeclData, DeclNode, NodeData, NodeId};
use crate::graph::Graph;
use std::ops::Range;

pub struct ReachabilityPass {
    /// Ids whose unvisited nodes get filtered by this pass.
    pub filter_range: Range<u32>,
    /// The id segment holding externally materialized declarations; member
    /// edges pointing into it are not followed.
    pub extern_range: Range<u32>,
}

pub struct ReachabilityResult {
    pub filtered: usize,
    /// Visited nodes inside the external segment, in visit order. The
    /// per-declaration saver uses these as the roots of the shared "extra"
    /// partition.
    pub visited_external: Vec<NodeId>,
}

impl Graph {
    pub fn filter_unreachable(
        &mut self,
        roots: &[NodeId],
        pass: &ReachabilityPass,
    ) -> Result<ReachabilityResult> {
        let mut visited = vec![false; self.len()];
        let mut visited_external = Vec::new();
        let mut stack: Vec<NodeId> = roots.to_vec();

        while let Some(id) = stack.pop() {
            if id.is_none() || visited[id.index()] {
                continue;
            }
            visited[id.index()] = true;
            if pass.extern_range.contains(&id.0) {
                visited_external.push(id);
            }

            // The owner chain stays visible, but is not expanded: a needed
            // external keeps its enclosing package/type without dragging in
            // every sibling member.
            let mut ancestor = self.node(id)?.parent;
            while ancestor.is_some() && !visited[ancestor.index()] {
                visited[ancestor.index()] = true;
                if pass.extern_range.contains(&ancestor.0) {
                    visited_external.push(ancestor);
                }
                ancestor = self.node(ancestor)?.parent;
            }

            let node = self.node(id)?;
            stack.extend(node.comments.iter().copied());

            let mut edges = Vec::new();
            node.data.reference_edges(&mut edges);
            match &node.data {
                NodeData::Package(pkg) => {
                    edges.extend(pkg.annotations.iter().copied());
                    edges.extend(pkg.compilation_units.iter().copied());
                    edges.extend(
                        pkg.members
                            .iter()
                            .copied()
                            .filter(|m| !pass.extern_range.contains(&m.0)),
                    );
                }
                NodeData::Decl(DeclNode {
                    annotations,
                    data: DeclData::Type(decl),
                    ..
                }) => {
                    edges.extend(annotations.iter().copied());
                    edges.extend(decl.type_parameters.iter().copied());
                    if decl.superclass.is_some() {
                        edges.push(decl.superclass);
                    }
                    edges.extend(decl.super_interfaces.iter().copied());
                    edges.extend(decl.others.iter().copied());
                    edges.extend(
                        decl.members
                            .iter()
                            .copied()
                            .filter(|m| !pass.extern_range.contains(&m.0)),
                    );
                }
                data => data.owned_children(&mut edges),
            }
            stack.extend(edges);
        }

        let mut filtered = 0;
        for raw in pass.filter_range.clone() {
            let id = NodeId(raw);
            if id.is_none() || !self.exists(id) {
                continue;
            }
            if !visited[id.index()] {
                self.set_filtered_this_node_only(id)?;
                filtered += 1;
            }
        }

        Ok(ReachabilityResult {
            filtered,
            visited_external,
        })
    }
}
