//! Resolver Tests
//!
//! End-to-end behavior of the legacy descriptor API: index path shape,
//! decode round trips, cache convergence under threads, absent legacy
//! views and the embedded fast path.

use std::sync::{Arc, OnceLock};

use legacy_descriptor::codec;
use legacy_descriptor::reflect::{EnumBuilder, FileBuilder, MessageBuilder};
use legacy_descriptor::{
    derive_raw_descriptor, navigate, wellknown, Descriptor, DescriptorKind, DescriptorResolver,
    FileDescriptor, FileTreeCache, GeneratedEnum, GeneratedMessage, LegacyDescriptor, RawDescriptor,
    RawDescriptorCache, TypeRegistry,
};

// =============================================================================
// Fixtures
// =============================================================================

fn shop_file() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        FileBuilder::new("shop/order.proto", "shop")
            .message(
                MessageBuilder::new("Foo")
                    .message(MessageBuilder::new("Bar").enumeration(EnumBuilder::new("Flag").value("FLAG_NONE", 0)))
                    .enumeration(EnumBuilder::new("State").value("STATE_OPEN", 0).value("STATE_CLOSED", 1)),
            )
            .message(MessageBuilder::new("Receipt"))
            .enumeration(EnumBuilder::new("Currency").value("EUR", 0).value("USD", 1))
            .build()
    })
}

struct Foo;
impl GeneratedMessage for Foo {}

struct Bar;
impl GeneratedMessage for Bar {}

#[derive(Clone, Copy)]
enum State {
    Open,
}
impl GeneratedEnum for State {}

#[derive(Clone, Copy)]
enum Currency {
    Eur,
}
impl GeneratedEnum for Currency {}

#[derive(Clone, Copy)]
enum Flag {
    None,
}
impl GeneratedEnum for Flag {}

struct Floating;
impl GeneratedMessage for Floating {}

#[derive(Clone, Copy)]
enum FloatingKind {
    Any,
}
impl GeneratedEnum for FloatingKind {}

fn lookup(name: &str) -> Descriptor {
    shop_file().find(name).unwrap()
}

fn resolver() -> DescriptorResolver {
    let registry = TypeRegistry::new();
    registry.register_message::<Foo>(lookup("shop.Foo")).unwrap();
    registry.register_message::<Bar>(lookup("shop.Foo.Bar")).unwrap();
    registry.register_enum::<State>(lookup("shop.Foo.State")).unwrap();
    registry.register_enum::<Currency>(lookup("shop.Currency")).unwrap();
    registry.register_enum::<Flag>(lookup("shop.Foo.Bar.Flag")).unwrap();

    let floating = MessageBuilder::new("Floating")
        .enumeration(EnumBuilder::new("FloatingKind"))
        .build_detached();
    registry.register_enum::<FloatingKind>(floating.enums().next().unwrap()).unwrap();
    registry.register_message::<Floating>(floating).unwrap();

    DescriptorResolver::new(Arc::new(registry))
}

// =============================================================================
// Path Shape
// =============================================================================

#[test]
fn test_top_level_message_path() {
    let raw = resolver().raw_descriptor_for_message(&Foo).unwrap();
    assert_eq!(raw.indexes(), &[0]);
}

#[test]
fn test_nested_message_path() {
    let raw = resolver().raw_descriptor_for_message(&Bar).unwrap();
    assert_eq!(raw.indexes(), &[0, 0]);
}

#[test]
fn test_enum_paths() {
    let resolver = resolver();
    assert_eq!(resolver.raw_descriptor_for_enum(&Currency::Eur).unwrap().indexes(), &[0]);
    assert_eq!(resolver.raw_descriptor_for_enum(&State::Open).unwrap().indexes(), &[0, 0]);
    assert_eq!(resolver.raw_descriptor_for_enum(&Flag::None).unwrap().indexes(), &[0, 0, 0]);
}

// =============================================================================
// Decoded Declarations
// =============================================================================

#[test]
fn test_descriptor_proto_for_message() {
    let (file, bar) = resolver().descriptor_proto_for_message(&Bar).unwrap();
    assert_eq!(file.name(), "shop/order.proto");
    assert_eq!(file.package(), "shop");
    assert_eq!(bar.name(), "Bar");
    assert_eq!(bar.enum_type[0].name(), "Flag");
}

#[test]
fn test_descriptor_proto_for_enum() {
    let resolver = resolver();
    let (_, currency) = resolver.descriptor_proto_for_enum(&Currency::Eur).unwrap();
    assert_eq!(currency.name(), "Currency");
    assert_eq!(currency.value[1].name(), "USD");

    let (_, state) = resolver.descriptor_proto_for_enum(&State::Open).unwrap();
    assert_eq!(state.name(), "State");

    let (_, flag) = resolver.descriptor_proto_for_enum(&Flag::None).unwrap();
    assert_eq!(flag.name(), "Flag");
}

#[test]
fn test_each_raw_buffer_decodes_once() {
    let resolver = resolver();
    let (file_a, _) = resolver.descriptor_proto_for_message(&Foo).unwrap();
    let (file_b, _) = resolver.descriptor_proto_for_enum(&Currency::Eur).unwrap();
    // Each descriptor derives its own buffer, so each buffer decodes once
    assert_eq!(file_a, file_b);
    assert_eq!(resolver.file_cache().len(), 2);

    let (file_c, _) = resolver.descriptor_proto_for_message(&Foo).unwrap();
    assert!(Arc::ptr_eq(&file_a, &file_c));
}

// =============================================================================
// Round Trip
// =============================================================================

fn collect(desc: Descriptor, out: &mut Vec<Descriptor>) {
    for child in desc.messages().chain(desc.enums()) {
        out.push(child.clone());
        collect(child, out);
    }
}

#[test]
fn test_every_declaration_round_trips() {
    for file in wellknown::all().into_iter().chain([shop_file()]) {
        let mut declarations = Vec::new();
        collect(file.descriptor().clone(), &mut declarations);
        assert!(!declarations.is_empty());

        for desc in declarations {
            let raw = derive_raw_descriptor(&desc).unwrap().unwrap();
            let tree = codec::decode_file(raw.bytes()).unwrap();
            assert_eq!(tree.name(), file.path());
            let name = match desc.kind() {
                DescriptorKind::Message => navigate::locate_message(&tree, raw.indexes()).unwrap().name().to_string(),
                DescriptorKind::Enum => navigate::locate_enum(&tree, raw.indexes()).unwrap().name().to_string(),
                DescriptorKind::File => unreachable!(),
            };
            assert_eq!(name, desc.name(), "round trip of {}", desc.full_name());
        }
    }
}

// =============================================================================
// Determinism and Convergence
// =============================================================================

#[test]
fn test_derivation_is_deterministic() {
    let value = wellknown::structpb().find("google.protobuf.Value").unwrap();
    let a = derive_raw_descriptor(&value).unwrap().unwrap();
    let b = derive_raw_descriptor(&value).unwrap().unwrap();
    assert_eq!(a.bytes(), b.bytes());
    assert_eq!(a.indexes(), b.indexes());
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert!(!Arc::ptr_eq(a.file(), b.file()));
}

#[test]
fn test_concurrent_callers_converge() {
    let resolver = resolver();
    let results: Vec<RawDescriptor> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| resolver.raw_descriptor_for_message(&Bar).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &results[0];
    for raw in &results {
        assert_eq!(raw, first);
    }
    assert_eq!(resolver.raw_cache().len(), 1);

    let published = resolver.raw_descriptor_for_message(&Bar).unwrap();
    assert_eq!(&published, first);
}

#[test]
fn test_concurrent_decodes_converge() {
    let files = FileTreeCache::new();
    let raw = RawDescriptorCache::new()
        .get_or_derive(&lookup("shop.Receipt"))
        .unwrap()
        .unwrap();
    let trees: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| files.get_or_decode(raw.file()))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(files.len(), 1);
    let published = files.get_or_decode(raw.file());
    assert!(trees.iter().all(|t| **t == *published));
}

#[test]
fn test_resolvers_can_share_caches() {
    let raw = Arc::new(RawDescriptorCache::new());
    let files = Arc::new(FileTreeCache::new());
    let registry = Arc::new(TypeRegistry::new());
    registry.register_message::<Foo>(lookup("shop.Foo")).unwrap();

    let a = DescriptorResolver::with_caches(Arc::clone(&registry), Arc::clone(&raw), Arc::clone(&files));
    let b = DescriptorResolver::with_caches(registry, Arc::clone(&raw), Arc::clone(&files));
    let (file_a, _) = a.descriptor_proto_for_message(&Foo).unwrap();
    let (file_b, _) = b.descriptor_proto_for_message(&Foo).unwrap();
    assert!(Arc::ptr_eq(&file_a, &file_b));
    assert_eq!(raw.len(), 1);
}

// =============================================================================
// Absent Legacy View
// =============================================================================

#[test]
fn test_detached_descriptors_are_absent() {
    let resolver = resolver();
    assert!(resolver.raw_descriptor_for_message(&Floating).is_none());
    assert!(resolver.descriptor_proto_for_message(&Floating).is_none());
    assert!(resolver.raw_descriptor_for_enum(&FloatingKind::Any).is_none());
    assert!(resolver.descriptor_proto_for_enum(&FloatingKind::Any).is_none());
    assert!(resolver.try_descriptor_proto_for_message(&Floating).unwrap().is_none());
}

#[test]
fn test_unregistered_types_are_absent() {
    let resolver = DescriptorResolver::new(Arc::new(TypeRegistry::new()));
    assert!(resolver.raw_descriptor_for_message(&Foo).is_none());
    assert!(resolver.descriptor_proto_for_enum(&Currency::Eur).is_none());
}

// =============================================================================
// Embedded Fast Path
// =============================================================================

fn embedded_raw() -> RawDescriptor {
    static RAW: OnceLock<RawDescriptor> = OnceLock::new();
    RAW.get_or_init(|| {
        let file = FileBuilder::new("legacy/embedded.proto", "legacy")
            .message(MessageBuilder::new("Zero"))
            .message(MessageBuilder::new("Embedded"))
            .build();
        RawDescriptor::new(codec::encode_file(&file.to_proto()).unwrap(), vec![1])
    })
    .clone()
}

struct Embedded;
impl GeneratedMessage for Embedded {
    const LEGACY_DESCRIPTOR: LegacyDescriptor = LegacyDescriptor::SelfDescribing(embedded_raw);
}

fn corrupt_raw() -> RawDescriptor {
    static RAW: OnceLock<RawDescriptor> = OnceLock::new();
    RAW.get_or_init(|| RawDescriptor::new(b"not a raw descriptor".to_vec(), vec![0]))
        .clone()
}

struct Corrupt;
impl GeneratedMessage for Corrupt {
    const LEGACY_DESCRIPTOR: LegacyDescriptor = LegacyDescriptor::SelfDescribing(corrupt_raw);
}

fn misaligned_raw() -> RawDescriptor {
    static RAW: OnceLock<RawDescriptor> = OnceLock::new();
    RAW.get_or_init(|| {
        let file = FileBuilder::new("legacy/short.proto", "legacy")
            .message(MessageBuilder::new("Only"))
            .build();
        RawDescriptor::new(codec::encode_file(&file.to_proto()).unwrap(), vec![0, 4])
    })
    .clone()
}

#[derive(Clone, Copy)]
enum Misaligned {
    Value,
}
impl GeneratedEnum for Misaligned {
    const LEGACY_DESCRIPTOR: LegacyDescriptor = LegacyDescriptor::SelfDescribing(misaligned_raw);
}

#[test]
fn test_embedded_descriptor_wins() {
    let registry = TypeRegistry::new();
    // A registered descriptor that would derive a different answer
    registry.register_message::<Embedded>(lookup("shop.Receipt")).unwrap();
    let resolver = DescriptorResolver::new(Arc::new(registry));

    let raw = resolver.raw_descriptor_for_message(&Embedded).unwrap();
    assert_eq!(raw, embedded_raw());
    assert!(Arc::ptr_eq(raw.file(), embedded_raw().file()));
    assert!(resolver.raw_cache().is_empty());

    let (file, message) = resolver.descriptor_proto_for_message(&Embedded).unwrap();
    assert_eq!(file.name(), "legacy/embedded.proto");
    assert_eq!(message.name(), "Embedded");
}

#[test]
fn test_corrupt_embedded_descriptor_is_a_fault() {
    let resolver = resolver();
    assert_eq!(resolver.raw_descriptor_for_message(&Corrupt).unwrap(), corrupt_raw());
    let err = resolver.try_descriptor_proto_for_message(&Corrupt).unwrap_err();
    assert!(err.is_integrity_fault());
}

#[test]
#[should_panic(expected = "corrupt descriptor data")]
fn test_corrupt_embedded_descriptor_panics() {
    resolver().descriptor_proto_for_message(&Corrupt);
}

#[test]
#[should_panic(expected = "out of range")]
fn test_misaligned_index_path_panics() {
    resolver().descriptor_proto_for_enum(&Misaligned::Value);
}
