//! Generated Type Registry
//!
//! Maps concrete generated message and enum types to their reflective
//! descriptors, and declares per type whether it can report its own raw
//! descriptor.

use std::any::TypeId;

use dashmap::DashMap;

use crate::derive::RawDescriptor;
use crate::error::{DescriptorError, Result};
use crate::reflect::{Descriptor, DescriptorKind};

/// How a generated type provides its legacy raw descriptor
#[derive(Debug, Clone, Copy)]
pub enum LegacyDescriptor {
    /// The type embeds its own raw descriptor. The function should hand out
    /// the same buffer on every call so decoded trees stay cached.
    SelfDescribing(fn() -> RawDescriptor),
    /// The raw descriptor must be derived from the reflective descriptor
    NeedsDerivation,
}

/// A generated message type
pub trait GeneratedMessage: 'static {
    const LEGACY_DESCRIPTOR: LegacyDescriptor = LegacyDescriptor::NeedsDerivation;
}

/// A generated enum type
pub trait GeneratedEnum: 'static {
    const LEGACY_DESCRIPTOR: LegacyDescriptor = LegacyDescriptor::NeedsDerivation;
}

/// Reflective descriptors of generated types, keyed by Rust type
#[derive(Debug, Default)]
pub struct TypeRegistry {
    messages: DashMap<TypeId, Descriptor>,
    enums: DashMap<TypeId, Descriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate message type `M` with its descriptor, replacing any earlier one
    pub fn register_message<M: GeneratedMessage>(&self, desc: Descriptor) -> Result<()> {
        expect_kind(&desc, DescriptorKind::Message)?;
        tracing::debug!(descriptor = desc.full_name(), ty = std::any::type_name::<M>(), "registered message");
        self.messages.insert(TypeId::of::<M>(), desc);
        Ok(())
    }

    /// Associate enum type `E` with its descriptor, replacing any earlier one
    pub fn register_enum<E: GeneratedEnum>(&self, desc: Descriptor) -> Result<()> {
        expect_kind(&desc, DescriptorKind::Enum)?;
        tracing::debug!(descriptor = desc.full_name(), ty = std::any::type_name::<E>(), "registered enum");
        self.enums.insert(TypeId::of::<E>(), desc);
        Ok(())
    }

    pub fn message_descriptor<M: GeneratedMessage>(&self) -> Option<Descriptor> {
        self.messages.get(&TypeId::of::<M>()).map(|d| d.value().clone())
    }

    pub fn enum_descriptor<E: GeneratedEnum>(&self) -> Option<Descriptor> {
        self.enums.get(&TypeId::of::<E>()).map(|d| d.value().clone())
    }
}

fn expect_kind(desc: &Descriptor, expected: DescriptorKind) -> Result<()> {
    if desc.kind() == expected {
        Ok(())
    } else {
        Err(DescriptorError::KindMismatch {
            name: desc.full_name().to_string(),
            expected,
            actual: desc.kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{EnumBuilder, FileBuilder, MessageBuilder};

    struct Ping;
    impl GeneratedMessage for Ping {}

    struct Pong;
    impl GeneratedMessage for Pong {}

    enum Status {}
    impl GeneratedEnum for Status {}

    #[test]
    fn test_register_and_lookup() {
        let file = FileBuilder::new("test/registry.proto", "test")
            .message(MessageBuilder::new("Ping"))
            .enumeration(EnumBuilder::new("Status"))
            .build();
        let registry = TypeRegistry::new();
        registry.register_message::<Ping>(file.find("test.Ping").unwrap()).unwrap();
        registry.register_enum::<Status>(file.find("test.Status").unwrap()).unwrap();

        assert_eq!(registry.message_descriptor::<Ping>().unwrap().full_name(), "test.Ping");
        assert_eq!(registry.enum_descriptor::<Status>().unwrap().full_name(), "test.Status");
        assert!(registry.message_descriptor::<Pong>().is_none());
    }

    #[test]
    fn test_register_rejects_wrong_kind() {
        let status = EnumBuilder::new("Status").build_detached();
        let registry = TypeRegistry::new();
        let err = registry.register_message::<Ping>(status).unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::KindMismatch {
                expected: DescriptorKind::Message,
                actual: DescriptorKind::Enum,
                ..
            }
        ));
    }

    #[test]
    fn test_default_capability_needs_derivation() {
        assert!(matches!(Ping::LEGACY_DESCRIPTOR, LegacyDescriptor::NeedsDerivation));
    }
}
