//! Structural keys for canonicalized nodes.
//!
//! Comments and type nodes are interchangeable values: two structurally equal
//! ones must share a single node id. The key is the kind tag plus the operand
//! ids/scalars, hashed with xxh3 inside the canonicalization map.

use crate::graph::kind::NodeKind;
use crate::graph::node::{NodeId, PrimitiveKind, WildcardBound};
use crate::graph::range::Range;
use crate::storage::strtable::StrKey;
use xxhash_rust::xxh3::Xxh3Builder;

pub type FlyweightMap = std::collections::HashMap<FlyweightKey, NodeId, Xxh3Builder>;

pub fn flyweight_map() -> FlyweightMap {
    FlyweightMap::with_hasher(Xxh3Builder::new())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlyweightKey {
    kind: NodeKind,
    operands: Vec<u64>,
}

impl FlyweightKey {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            operands: Vec::new(),
        }
    }

    pub fn id(mut self, id: NodeId) -> Self {
        self.operands.push(id.0 as u64);
        self
    }

    pub fn ids(mut self, ids: &[NodeId]) -> Self {
        // Length first, so [a] ++ [] and [] ++ [a] cannot collide.
        self.operands.push(ids.len() as u64);
        self.operands.extend(ids.iter().map(|id| id.0 as u64));
        self
    }

    pub fn scalar(mut self, value: u64) -> Self {
        self.operands.push(value);
        self
    }

    pub fn str_key(self, key: StrKey) -> Self {
        self.scalar(key.0 as u64)
    }

    pub fn primitive(self, kind: PrimitiveKind) -> Self {
        self.scalar(kind as u64)
    }

    pub fn bound(self, bound: WildcardBound) -> Self {
        self.scalar(bound as u64)
    }

    pub fn range(mut self, range: &Range) -> Self {
        self.operands.push(range.path.0 as u64);
        for point in [range.start, range.end, range.wide_start, range.wide_end] {
            self.operands.push(((point.line as u64) << 32) | point.col as u64);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::NodeId;

    #[test]
    fn test_structural_equality() {
        let a = FlyweightKey::new(NodeKind::ArrayType)
            .scalar(2)
            .id(NodeId(7));
        let b = FlyweightKey::new(NodeKind::ArrayType)
            .scalar(2)
            .id(NodeId(7));
        let c = FlyweightKey::new(NodeKind::ArrayType)
            .scalar(1)
            .id(NodeId(7));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_list_boundaries_do_not_collide() {
        let a = FlyweightKey::new(NodeKind::MethodType)
            .id(NodeId(1))
            .ids(&[NodeId(2)])
            .ids(&[]);
        let b = FlyweightKey::new(NodeKind::MethodType)
            .id(NodeId(1))
            .ids(&[])
            .ids(&[NodeId(2)]);
        assert_ne!(a, b);
    }
}
