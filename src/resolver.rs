//! Descriptor Resolver
//!
//! Legacy-era entry point. Answers "raw descriptor" and "decoded
//! declaration" queries for generated message and enum values, preferring a
//! type's own embedded raw descriptor and otherwise deriving one from the
//! type's reflective descriptor.
//!
//! Two outcomes are kept apart on purpose:
//! - `None`: the value has no legacy view (unregistered type, or a
//!   descriptor outside any file). Routine, callers fall back.
//! - panic (or `Err` from the `try_` variants): the raw bytes or index path
//!   are corrupt. Never expected at runtime.

use std::sync::Arc;

use crate::cache::{FileTreeCache, RawDescriptorCache};
use crate::derive::RawDescriptor;
use crate::descriptorpb::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto};
use crate::error::Result;
use crate::navigate;
use crate::reflect::Descriptor;
use crate::registry::{GeneratedEnum, GeneratedMessage, LegacyDescriptor, TypeRegistry};

/// A decoded file and one message declared in it
pub type MessageDeclaration = (Arc<FileDescriptorProto>, Arc<DescriptorProto>);

/// A decoded file and one enum declared in it
pub type EnumDeclaration = (Arc<FileDescriptorProto>, Arc<EnumDescriptorProto>);

/// Resolves legacy descriptors for generated types
///
/// Cheap to clone; clones share the registry and both caches. Build one at
/// startup and pass it to whatever needs legacy descriptors.
#[derive(Debug, Clone)]
pub struct DescriptorResolver {
    registry: Arc<TypeRegistry>,
    raw: Arc<RawDescriptorCache>,
    files: Arc<FileTreeCache>,
}

impl DescriptorResolver {
    /// Resolver over `registry` with fresh caches
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_caches(registry, Arc::default(), Arc::default())
    }

    /// Resolver sharing existing caches
    pub fn with_caches(
        registry: Arc<TypeRegistry>,
        raw: Arc<RawDescriptorCache>,
        files: Arc<FileTreeCache>,
    ) -> Self {
        Self { registry, raw, files }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn raw_cache(&self) -> &RawDescriptorCache {
        &self.raw
    }

    pub fn file_cache(&self) -> &FileTreeCache {
        &self.files
    }

    /// Compressed file descriptor and index path of `E`'s declaration
    pub fn raw_descriptor_for_enum<E: GeneratedEnum>(&self, value: &E) -> Option<RawDescriptor> {
        self.try_raw_descriptor_for_enum(value)
            .unwrap_or_else(|err| crate::integrity_fault(err))
    }

    /// Compressed file descriptor and index path of `M`'s declaration
    pub fn raw_descriptor_for_message<M: GeneratedMessage>(&self, value: &M) -> Option<RawDescriptor> {
        self.try_raw_descriptor_for_message(value)
            .unwrap_or_else(|err| crate::integrity_fault(err))
    }

    /// Decoded file and enum declaration of `E`
    ///
    /// The returned trees are shared with the cache.
    pub fn descriptor_proto_for_enum<E: GeneratedEnum>(&self, value: &E) -> Option<EnumDeclaration> {
        self.try_descriptor_proto_for_enum(value)
            .unwrap_or_else(|err| crate::integrity_fault(err))
    }

    /// Decoded file and message declaration of `M`
    ///
    /// The returned trees are shared with the cache.
    pub fn descriptor_proto_for_message<M: GeneratedMessage>(
        &self,
        value: &M,
    ) -> Option<MessageDeclaration> {
        self.try_descriptor_proto_for_message(value)
            .unwrap_or_else(|err| crate::integrity_fault(err))
    }

    pub fn try_raw_descriptor_for_enum<E: GeneratedEnum>(&self, _value: &E) -> Result<Option<RawDescriptor>> {
        self.raw_descriptor(E::LEGACY_DESCRIPTOR, || self.registry.enum_descriptor::<E>())
    }

    pub fn try_raw_descriptor_for_message<M: GeneratedMessage>(
        &self,
        _value: &M,
    ) -> Result<Option<RawDescriptor>> {
        self.raw_descriptor(M::LEGACY_DESCRIPTOR, || self.registry.message_descriptor::<M>())
    }

    pub fn try_descriptor_proto_for_enum<E: GeneratedEnum>(
        &self,
        value: &E,
    ) -> Result<Option<EnumDeclaration>> {
        let Some(raw) = self.try_raw_descriptor_for_enum(value)? else {
            return Ok(None);
        };
        let file = self.files.try_get_or_decode(raw.file())?;
        let declaration = navigate::locate_enum(&file, raw.indexes())?;
        Ok(Some((file, declaration)))
    }

    pub fn try_descriptor_proto_for_message<M: GeneratedMessage>(
        &self,
        value: &M,
    ) -> Result<Option<MessageDeclaration>> {
        let Some(raw) = self.try_raw_descriptor_for_message(value)? else {
            return Ok(None);
        };
        let file = self.files.try_get_or_decode(raw.file())?;
        let declaration = navigate::locate_message(&file, raw.indexes())?;
        Ok(Some((file, declaration)))
    }

    fn raw_descriptor(
        &self,
        capability: LegacyDescriptor,
        lookup: impl FnOnce() -> Option<Descriptor>,
    ) -> Result<Option<RawDescriptor>> {
        match capability {
            LegacyDescriptor::SelfDescribing(embedded) => Ok(Some(embedded())),
            LegacyDescriptor::NeedsDerivation => match lookup() {
                Some(desc) => self.raw.get_or_derive(&desc),
                None => Ok(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{EnumBuilder, FileBuilder, MessageBuilder};

    struct Foo;
    impl GeneratedMessage for Foo {}

    #[derive(Clone, Copy)]
    enum Kind {
        Unset,
    }
    impl GeneratedEnum for Kind {}

    fn resolver() -> DescriptorResolver {
        let file = FileBuilder::new("test/resolver.proto", "test")
            .message(MessageBuilder::new("Foo").enumeration(EnumBuilder::new("Kind").value("KIND_UNSET", 0)))
            .build();
        let registry = TypeRegistry::new();
        registry.register_message::<Foo>(file.find("test.Foo").unwrap()).unwrap();
        registry.register_enum::<Kind>(file.find("test.Foo.Kind").unwrap()).unwrap();
        DescriptorResolver::new(Arc::new(registry))
    }

    #[test]
    fn test_nested_enum_resolves() {
        let resolver = resolver();
        let raw = resolver.raw_descriptor_for_enum(&Kind::Unset).unwrap();
        assert_eq!(raw.indexes(), &[0, 0]);

        let (file, kind) = resolver.descriptor_proto_for_enum(&Kind::Unset).unwrap();
        assert_eq!(file.name(), "test/resolver.proto");
        assert_eq!(kind.name(), "Kind");
        assert_eq!(kind.value[0].name(), "KIND_UNSET");
    }

    #[test]
    fn test_repeated_queries_hit_caches() {
        let resolver = resolver();
        let (file_a, foo_a) = resolver.descriptor_proto_for_message(&Foo).unwrap();
        let (file_b, foo_b) = resolver.descriptor_proto_for_message(&Foo).unwrap();
        assert!(Arc::ptr_eq(&file_a, &file_b));
        assert!(Arc::ptr_eq(&foo_a, &foo_b));
        assert_eq!(resolver.raw_cache().len(), 1);
        assert_eq!(resolver.file_cache().len(), 1);
    }

    #[test]
    fn test_unregistered_type_is_absent() {
        struct Stranger;
        impl GeneratedMessage for Stranger {}

        let resolver = resolver();
        assert!(resolver.raw_descriptor_for_message(&Stranger).is_none());
        assert!(resolver.descriptor_proto_for_message(&Stranger).is_none());
    }
}
