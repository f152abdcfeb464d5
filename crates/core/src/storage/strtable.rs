//! The string table persisted at the end of every graph file.
//!
//! Paths and comment texts are interned here and referenced by key from node
//! data, so one underlying pool can back many nodes without duplication.

use crate::error::{GraphError, Result};
use crate::storage::io::{ReadExt, WriteExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Key into the string table. Zero is reserved for "no string".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StrKey(pub u32);

impl StrKey {
    pub const NONE: StrKey = StrKey(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Default)]
pub struct StrTable {
    entries: IndexMap<String, ()>,
}

impl StrTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `text`, returning the existing key when already present.
    pub fn set(&mut self, text: &str) -> StrKey {
        if let Some(index) = self.entries.get_index_of(text) {
            return StrKey(index as u32 + 1);
        }
        let (index, _) = self.entries.insert_full(text.to_owned(), ());
        StrKey(index as u32 + 1)
    }

    /// Looks `text` up without interning it.
    pub fn get(&self, text: &str) -> Option<StrKey> {
        self.entries
            .get_index_of(text)
            .map(|index| StrKey(index as u32 + 1))
    }

    pub fn resolve(&self, key: StrKey) -> Option<&str> {
        if key.is_none() {
            return None;
        }
        self.entries
            .get_index(key.0 as usize - 1)
            .map(|(text, _)| text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32(self.entries.len() as u32)?;
        for (text, _) in &self.entries {
            w.write_str(text)?;
        }
        Ok(())
    }

    pub fn load<R: Read>(r: &mut R) -> Result<StrTable> {
        let count = r.read_u32()?;
        let mut table = StrTable::new();
        for _ in 0..count {
            let text = r.read_str()?;
            table.entries.insert(text, ());
        }
        if table.entries.len() != count as usize {
            return Err(GraphError::Format(
                "duplicate entries in string table".into(),
            ));
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_stable() {
        let mut table = StrTable::new();
        let a = table.set("alpha");
        let b = table.set("beta");
        assert_ne!(a, b);
        assert_eq!(table.set("alpha"), a);
        assert_eq!(table.resolve(a), Some("alpha"));
        assert_eq!(table.resolve(StrKey::NONE), None);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut table = StrTable::new();
        let keys: Vec<_> = ["x", "y", "some/longer/path.java"]
            .iter()
            .map(|s| table.set(s))
            .collect();

        let mut buf = Vec::new();
        table.save(&mut buf).unwrap();
        let loaded = StrTable::load(&mut buf.as_slice()).unwrap();

        for (key, text) in keys.iter().zip(["x", "y", "some/longer/path.java"]) {
            assert_eq!(loaded.resolve(*key), Some(text));
        }
    }
}
