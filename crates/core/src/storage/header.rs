//! Graph file header: format tag, version markers and free-form metadata.

use crate::error::{GraphError, Result};
use crate::storage::io::{ReadExt, WriteExt};
use indexmap::IndexMap;
use std::io::{Read, Write};

/// On-disk format tag. A file carrying anything else is not ours.
pub const FORMAT_TAG: &str = "SemanticGraph";
/// Version of the node/edge schema.
pub const API_VERSION: &str = "0.3";
/// Version of the binary encoding itself.
pub const BINARY_VERSION: &str = "3";

const KEY_TYPE: &str = "Type";
const KEY_API_VERSION: &str = "APIVersion";
const KEY_BINARY_VERSION: &str = "BinaryVersion";

/// Arbitrary key/value metadata saved in front of the node stream
/// (timestamp, platform, changeset id and the like).
#[derive(Debug, Clone, Default)]
pub struct Header {
    entries: IndexMap<String, String>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(KEY_TYPE.into(), FORMAT_TAG.into());
        entries.insert(KEY_API_VERSION.into(), API_VERSION.into());
        entries.insert(KEY_BINARY_VERSION.into(), BINARY_VERSION.into());

        w.write_u32(entries.len() as u32)?;
        for (key, value) in &entries {
            w.write_str(key)?;
            w.write_str(value)?;
        }
        Ok(())
    }

    /// Reads the header and rejects the file unless the format tag and both
    /// version markers match exactly. Runs before any node data is touched.
    pub(crate) fn read<R: Read>(r: &mut R) -> Result<Header> {
        let count = r.read_u32()?;
        let mut entries = IndexMap::new();
        for _ in 0..count {
            let key = r.read_str()?;
            let value = r.read_str()?;
            entries.insert(key, value);
        }
        let header = Header { entries };

        match header.get(KEY_TYPE) {
            None => {
                return Err(GraphError::Format("missing file type information".into()));
            }
            Some(tag) if tag != FORMAT_TAG => {
                return Err(GraphError::FileType {
                    expected: FORMAT_TAG.into(),
                    found: tag.into(),
                });
            }
            Some(_) => {}
        }
        check_version(&header, KEY_API_VERSION, "API", API_VERSION)?;
        check_version(&header, KEY_BINARY_VERSION, "binary", BINARY_VERSION)?;
        Ok(header)
    }
}

fn check_version(header: &Header, key: &str, which: &'static str, expected: &str) -> Result<()> {
    match header.get(key) {
        None => Err(GraphError::Format(format!(
            "missing {which} version information"
        ))),
        Some(found) if found != expected => Err(GraphError::Version {
            which,
            expected: expected.into(),
            found: found.into(),
        }),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_keeps_metadata() {
        let mut header = Header::new();
        header.add("platform", "linux");
        header.add("changeset", "abc123");

        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        let loaded = Header::read(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.get("platform"), Some("linux"));
        assert_eq!(loaded.get("changeset"), Some("abc123"));
        assert_eq!(loaded.get("Type"), Some(FORMAT_TAG));
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let mut header = Header::new();
        header.add("BinaryVersion", "2");

        let mut buf = Vec::new();
        // Write manually so the bad version survives.
        let mut entries = IndexMap::new();
        entries.insert("Type".to_string(), FORMAT_TAG.to_string());
        entries.insert("APIVersion".to_string(), API_VERSION.to_string());
        entries.insert("BinaryVersion".to_string(), "2".to_string());
        buf.write_u32(entries.len() as u32).unwrap();
        for (k, v) in &entries {
            buf.write_str(k).unwrap();
            buf.write_str(v).unwrap();
        }

        let err = Header::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, GraphError::Version { which: "binary", .. }));
    }
}
