//! Legacy Descriptor Bridge
//!
//! Converts between the two representations of a schema-description model:
//! the legacy form (a compressed file descriptor blob plus an index path to
//! one declaration) and the reflective form (a navigable tree of live
//! descriptor nodes).
//!
//! ## Flow
//!
//! ```text
//! caller
//!   └─ DescriptorResolver ── SelfDescribing? ──> embedded RawDescriptor
//!        │
//!        ├─ TypeRegistry ──> reflective Descriptor
//!        ├─ RawDescriptorCache / derive ──> RawDescriptor (bytes + index path)
//!        ├─ FileTreeCache / codec ──> FileDescriptorProto
//!        └─ navigate ──> DescriptorProto | EnumDescriptorProto
//! ```
//!
//! Derived values are immutable and shared; both caches are safe to use
//! from any number of threads.

pub mod alias;
pub mod cache;
pub mod checksum;
pub mod codec;
pub mod config;
pub mod derive;
pub mod descriptorpb;
pub mod error;
pub mod navigate;
pub mod reflect;
pub mod registry;
pub mod resolver;
pub mod wellknown;

pub use cache::{FileTreeCache, RawDescriptorCache};
pub use checksum::Fingerprint;
pub use derive::{derive_raw_descriptor, RawDescriptor};
pub use error::{DescriptorError, Result};
pub use reflect::{Descriptor, DescriptorId, DescriptorKind, FileDescriptor};
pub use registry::{GeneratedEnum, GeneratedMessage, LegacyDescriptor, TypeRegistry};
pub use resolver::{DescriptorResolver, EnumDeclaration, MessageDeclaration};

/// Abort on corrupt descriptor data
#[cold]
#[track_caller]
pub(crate) fn integrity_fault(err: DescriptorError) -> ! {
    tracing::error!(error = %err, "corrupt descriptor data");
    panic!("corrupt descriptor data: {err}")
}
