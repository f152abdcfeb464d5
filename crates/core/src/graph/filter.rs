//! Per-node filter mask.
//!
//! The mask grows in lock-step with the arena and only ever moves nodes from
//! visible to filtered within a pass; partitioned output resets the whole
//! mask between passes instead of un-filtering individual nodes.

use crate::error::{GraphError, Result};
use crate::graph::node::NodeId;
use crate::storage::io::{ReadExt, WriteExt};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct FilterMask {
    filtered: Vec<bool>,
}

impl FilterMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Grows the mask to cover `len` nodes; new entries are visible.
    pub fn resize(&mut self, len: usize) {
        if self.filtered.len() < len {
            self.filtered.resize(len, false);
        }
    }

    pub fn is_filtered(&self, id: NodeId) -> bool {
        self.filtered.get(id.index()).copied().unwrap_or(false)
    }

    /// Filters a single node without touching its subtree.
    pub fn set_filtered(&mut self, id: NodeId) {
        if let Some(slot) = self.filtered.get_mut(id.index()) {
            *slot = true;
        }
    }

    /// Resets every node to visible (used between partition passes).
    pub fn clear(&mut self) {
        self.filtered.fill(false);
    }

    pub fn count_filtered(&self) -> usize {
        self.filtered.iter().filter(|f| **f).count()
    }

    /// Writes the companion filter file: node count, then one byte per node
    /// (0 = visible, 1 = filtered).
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut w = std::io::BufWriter::new(file);
        self.write(&mut w)
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32(self.filtered.len() as u32)?;
        for filtered in &self.filtered {
            w.write_u8(*filtered as u8)?;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<FilterMask> {
        let file = std::fs::File::open(path)?;
        let mut r = std::io::BufReader::new(file);
        Self::read(&mut r)
    }

    pub fn read<R: Read>(r: &mut R) -> Result<FilterMask> {
        let count = r.read_u32()? as usize;
        let mut filtered = Vec::with_capacity(count);
        for _ in 0..count {
            match r.read_u8()? {
                0 => filtered.push(false),
                1 => filtered.push(true),
                other => {
                    return Err(GraphError::Format(format!(
                        "invalid filter state byte: {other}"
                    )))
                }
            }
        }
        Ok(FilterMask { filtered })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtering_is_idempotent_and_monotonic() {
        let mut mask = FilterMask::new();
        mask.resize(4);
        assert!(!mask.is_filtered(NodeId(2)));

        mask.set_filtered(NodeId(2));
        let count = mask.count_filtered();
        mask.set_filtered(NodeId(2));
        assert_eq!(mask.count_filtered(), count);
        assert!(mask.is_filtered(NodeId(2)));
    }

    #[test]
    fn test_growth_keeps_new_nodes_visible() {
        let mut mask = FilterMask::new();
        mask.resize(2);
        mask.set_filtered(NodeId(1));
        mask.resize(5);
        assert!(mask.is_filtered(NodeId(1)));
        assert!(!mask.is_filtered(NodeId(4)));
    }

    #[test]
    fn test_write_read_roundtrip() {
        let mut mask = FilterMask::new();
        mask.resize(3);
        mask.set_filtered(NodeId(1));

        let mut buf = Vec::new();
        mask.write(&mut buf).unwrap();
        let loaded = FilterMask::read(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(loaded.is_filtered(NodeId(1)));
        assert!(!loaded.is_filtered(NodeId(2)));
    }
}
