//! Raw descriptor derivation
//!
//! Reconstructs the legacy view of a reflective message or enum descriptor:
//! the compressed bytes of its whole file plus the index path from the file
//! root down to the declaration.

use std::sync::Arc;

use crate::checksum::Fingerprint;
use crate::codec;
use crate::error::Result;
use crate::reflect::{Descriptor, FileDescriptor};

/// Compressed file descriptor bytes and the index path to one declaration
///
/// Cloning shares both buffers. The byte buffer's allocation is its cache
/// identity, so hold on to the same `RawDescriptor` instead of rebuilding
/// one from equal bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDescriptor {
    file: Arc<[u8]>,
    indexes: Arc<[usize]>,
}

impl RawDescriptor {
    pub fn new(file: impl Into<Arc<[u8]>>, indexes: impl Into<Arc<[usize]>>) -> Self {
        Self {
            file: file.into(),
            indexes: indexes.into(),
        }
    }

    /// Compressed file descriptor bytes
    pub fn file(&self) -> &Arc<[u8]> {
        &self.file
    }

    pub fn bytes(&self) -> &[u8] {
        &self.file
    }

    /// Root-to-leaf index path
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_bytes(&self.file)
    }
}

/// Derive the raw descriptor for a message or enum declaration
///
/// Returns `Ok(None)` when the declaration is not contained in any file.
pub fn derive_raw_descriptor(desc: &Descriptor) -> Result<Option<RawDescriptor>> {
    let Some((file, indexes)) = ascend_to_file(desc) else {
        tracing::debug!(descriptor = desc.full_name(), "no enclosing file, no raw descriptor");
        return Ok(None);
    };

    let raw = RawDescriptor::new(codec::encode_file(&file.to_proto())?, indexes);
    let fingerprint = raw.fingerprint();
    tracing::debug!(
        descriptor = desc.full_name(),
        file = file.path(),
        indexes = ?raw.indexes(),
        fingerprint = fingerprint.short(),
        "derived raw descriptor"
    );
    Ok(Some(raw))
}

/// Walk up to the enclosing file, collecting the root-to-leaf index path
fn ascend_to_file(desc: &Descriptor) -> Option<(FileDescriptor, Vec<usize>)> {
    let mut indexes = Vec::new();
    let mut current = desc.clone();
    let file = loop {
        indexes.push(current.index());
        let parent = current.parent()?;
        if let Some(file) = parent.as_file() {
            break file;
        }
        current = parent;
    };
    indexes.reverse();
    Some((file, indexes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{EnumBuilder, FileBuilder, MessageBuilder};

    fn nested_file() -> FileDescriptor {
        FileBuilder::new("test/derive.proto", "test")
            .message(MessageBuilder::new("First"))
            .message(
                MessageBuilder::new("Outer")
                    .message(MessageBuilder::new("Skip"))
                    .message(
                        MessageBuilder::new("Middle")
                            .enumeration(EnumBuilder::new("A"))
                            .enumeration(EnumBuilder::new("Deep").value("DEEP_UNSET", 0)),
                    ),
            )
            .build()
    }

    #[test]
    fn test_index_path_is_root_to_leaf() {
        let file = nested_file();
        let deep = file.find("test.Outer.Middle.Deep").unwrap();
        let raw = derive_raw_descriptor(&deep).unwrap().unwrap();
        assert_eq!(raw.indexes(), &[1, 1, 1]);

        let outer = file.find("test.Outer").unwrap();
        let raw = derive_raw_descriptor(&outer).unwrap().unwrap();
        assert_eq!(raw.indexes(), &[1]);
    }

    #[test]
    fn test_all_declarations_share_file_bytes() {
        let file = nested_file();
        let a = derive_raw_descriptor(&file.find("test.First").unwrap()).unwrap().unwrap();
        let b = derive_raw_descriptor(&file.find("test.Outer.Middle.A").unwrap()).unwrap().unwrap();
        assert_eq!(a.bytes(), b.bytes());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_detached_declaration_has_no_raw_descriptor() {
        let orphan = MessageBuilder::new("Orphan")
            .enumeration(EnumBuilder::new("State"))
            .build_detached();
        assert!(derive_raw_descriptor(&orphan).unwrap().is_none());
        let state = orphan.enums().next().unwrap();
        assert!(derive_raw_descriptor(&state).unwrap().is_none());
    }

    #[test]
    fn test_file_node_has_no_raw_descriptor() {
        let file = nested_file();
        assert!(derive_raw_descriptor(file.descriptor()).unwrap().is_none());
    }
}
