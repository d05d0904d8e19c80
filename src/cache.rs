//! Identity-keyed descriptor caches
//!
//! Both caches compute on a miss without holding any lock and then publish
//! with store-if-absent. Concurrent misses on one key may each do the work,
//! but only the first published value is ever visible and every caller gets
//! that value back. Entries live as long as the cache.

use std::sync::Arc;

use dashmap::DashMap;

use crate::codec;
use crate::derive::{derive_raw_descriptor, RawDescriptor};
use crate::descriptorpb::FileDescriptorProto;
use crate::error::Result;
use crate::reflect::{Descriptor, DescriptorId};

/// Raw descriptors keyed by reflective descriptor identity
#[derive(Debug, Default)]
pub struct RawDescriptorCache {
    entries: DashMap<DescriptorId, RawDescriptor>,
}

impl RawDescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached raw descriptor for `desc`, deriving it on a miss
    ///
    /// `Ok(None)` when `desc` has no enclosing file; that outcome is not
    /// cached.
    pub fn get_or_derive(&self, desc: &Descriptor) -> Result<Option<RawDescriptor>> {
        let id = desc.id();
        if let Some(hit) = self.entries.get(&id) {
            tracing::trace!(descriptor = desc.full_name(), %id, "raw descriptor cache hit");
            return Ok(Some(hit.value().clone()));
        }

        let Some(derived) = derive_raw_descriptor(desc)? else {
            return Ok(None);
        };
        let published = self.entries.entry(id).or_insert(derived.clone()).value().clone();
        if !Arc::ptr_eq(published.file(), derived.file()) {
            tracing::debug!(descriptor = desc.full_name(), %id, "lost raw descriptor publication race");
        }
        Ok(Some(published))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Address of a byte buffer's allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BlobKey(usize);

impl BlobKey {
    fn of(blob: &Arc<[u8]>) -> Self {
        Self(Arc::as_ptr(blob).cast::<u8>() as usize)
    }
}

#[derive(Debug)]
struct FileEntry {
    /// Keeps the keyed allocation alive so its address is never reused
    _blob: Arc<[u8]>,
    file: Arc<FileDescriptorProto>,
}

/// Decoded file descriptors keyed by raw byte buffer identity
///
/// Two buffers with equal content are separate entries.
#[derive(Debug, Default)]
pub struct FileTreeCache {
    entries: DashMap<BlobKey, FileEntry>,
}

impl FileTreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the decoded tree for `blob`, decoding it on a miss
    pub fn try_get_or_decode(&self, blob: &Arc<[u8]>) -> Result<Arc<FileDescriptorProto>> {
        let key = BlobKey::of(blob);
        if let Some(hit) = self.entries.get(&key) {
            tracing::trace!(blob = key.0, "file tree cache hit");
            return Ok(Arc::clone(&hit.file));
        }

        let decoded = Arc::new(codec::decode_file(blob)?);
        let entry = self.entries.entry(key).or_insert_with(|| FileEntry {
            _blob: Arc::clone(blob),
            file: Arc::clone(&decoded),
        });
        if !Arc::ptr_eq(&entry.file, &decoded) {
            tracing::debug!(file = decoded.name(), "lost file tree publication race");
        }
        Ok(Arc::clone(&entry.file))
    }

    /// Like [`try_get_or_decode`](Self::try_get_or_decode), panicking on
    /// corrupt bytes
    pub fn get_or_decode(&self, blob: &Arc<[u8]>) -> Arc<FileDescriptorProto> {
        match self.try_get_or_decode(blob) {
            Ok(file) => file,
            Err(err) => crate::integrity_fault(err),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
