//! Reflective Descriptors
//!
//! A navigable tree of live schema declarations. Each tree is an immutable
//! arena (flat node list with parent indices) shared behind an `Arc`; a
//! [`Descriptor`] is a cheap handle naming one node of it.
//!
//! Every node receives a process-unique [`DescriptorId`] when its arena is
//! built. Caches key on that id, never on names, so two separately built
//! trees describing the same schema are distinct descriptors.

mod builder;

pub use builder::{EnumBuilder, FileBuilder, MessageBuilder};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::descriptorpb::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileOptions, MessageOptions, OneofDescriptorProto,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity handle of one reflective descriptor node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(u64);

impl DescriptorId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of declaration a descriptor node represents
///
/// A nested message is a `Message` whose parent is a `Message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    File,
    Message,
    Enum,
}

/// Schema syntax of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Syntax {
    #[default]
    Proto2,
    Proto3,
}

impl Syntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
        }
    }
}

#[derive(Debug)]
struct Node {
    id: DescriptorId,
    kind: DescriptorKind,
    parent: Option<usize>,
    /// Position among the parent's children of the same kind
    index: usize,
    name: String,
    full_name: String,
    messages: Vec<usize>,
    enums: Vec<usize>,
    fields: Vec<FieldDescriptorProto>,
    oneofs: Vec<String>,
    values: Vec<EnumValueDescriptorProto>,
    map_entry: bool,
}

impl Node {
    fn new(
        kind: DescriptorKind,
        parent: Option<usize>,
        index: usize,
        name: String,
        full_name: String,
    ) -> Self {
        Self {
            id: DescriptorId::next(),
            kind,
            parent,
            index,
            name,
            full_name,
            messages: Vec::new(),
            enums: Vec::new(),
            fields: Vec::new(),
            oneofs: Vec::new(),
            values: Vec::new(),
            map_entry: false,
        }
    }
}

/// File-level metadata, present only when the arena root is a file
#[derive(Debug)]
struct FileMeta {
    package: String,
    syntax: Syntax,
    dependency: Vec<String>,
    public_dependency: Vec<i32>,
    package_path: Option<String>,
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<Node>,
    file: Option<FileMeta>,
}

/// Handle to one node of a reflective descriptor tree
///
/// Equality and hashing follow node identity.
#[derive(Clone)]
pub struct Descriptor {
    arena: Arc<Arena>,
    node: usize,
}

impl Descriptor {
    fn at(&self, node: usize) -> Descriptor {
        Descriptor {
            arena: Arc::clone(&self.arena),
            node,
        }
    }

    fn data(&self) -> &Node {
        &self.arena.nodes[self.node]
    }

    pub fn id(&self) -> DescriptorId {
        self.data().id
    }

    pub fn kind(&self) -> DescriptorKind {
        self.data().kind
    }

    /// Short name (for a file, its path)
    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// Fully qualified name (e.g. "google.protobuf.Struct.FieldsEntry")
    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    /// Position within the parent's ordered list of children of this kind
    pub fn index(&self) -> usize {
        self.data().index
    }

    /// Enclosing declaration, `None` at the root of the tree
    pub fn parent(&self) -> Option<Descriptor> {
        self.data().parent.map(|p| self.at(p))
    }

    /// Nested (or, for a file, top-level) message declarations in order
    pub fn messages(&self) -> impl Iterator<Item = Descriptor> + '_ {
        self.data().messages.iter().map(move |&n| self.at(n))
    }

    /// Nested (or, for a file, top-level) enum declarations in order
    pub fn enums(&self) -> impl Iterator<Item = Descriptor> + '_ {
        self.data().enums.iter().map(move |&n| self.at(n))
    }

    pub fn fields(&self) -> &[FieldDescriptorProto] {
        &self.data().fields
    }

    pub fn values(&self) -> &[EnumValueDescriptorProto] {
        &self.data().values
    }

    /// View this node as a file, if it is one
    pub fn as_file(&self) -> Option<FileDescriptor> {
        (self.kind() == DescriptorKind::File).then(|| FileDescriptor(self.clone()))
    }

    fn message_proto(&self) -> DescriptorProto {
        let node = self.data();
        DescriptorProto {
            name: Some(node.name.clone()),
            field: node.fields.clone(),
            nested_type: self.messages().map(|m| Arc::new(m.message_proto())).collect(),
            enum_type: self.enums().map(|e| Arc::new(e.enum_proto())).collect(),
            oneof_decl: node
                .oneofs
                .iter()
                .map(|name| OneofDescriptorProto {
                    name: Some(name.clone()),
                })
                .collect(),
            options: node.map_entry.then(|| MessageOptions {
                map_entry: Some(true),
                deprecated: None,
            }),
        }
    }

    fn enum_proto(&self) -> EnumDescriptorProto {
        let node = self.data();
        EnumDescriptorProto {
            name: Some(node.name.clone()),
            value: node.values.clone(),
        }
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Descriptor {}

impl Hash for Descriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("full_name", &self.full_name())
            .field("index", &self.index())
            .finish()
    }
}

/// Root of a reflective tree describing one schema file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileDescriptor(Descriptor);

impl FileDescriptor {
    fn meta(&self) -> &FileMeta {
        match &self.0.arena.file {
            Some(meta) => meta,
            None => unreachable!("file node without file metadata"),
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.0
    }

    /// Path relative to the import root (e.g. "google/protobuf/struct.proto")
    pub fn path(&self) -> &str {
        self.0.name()
    }

    pub fn package(&self) -> &str {
        &self.meta().package
    }

    pub fn syntax(&self) -> Syntax {
        self.meta().syntax
    }

    pub fn messages(&self) -> impl Iterator<Item = Descriptor> + '_ {
        self.0.messages()
    }

    pub fn enums(&self) -> impl Iterator<Item = Descriptor> + '_ {
        self.0.enums()
    }

    /// Look up a message or enum anywhere in the file by fully qualified name
    pub fn find(&self, full_name: &str) -> Option<Descriptor> {
        self.0
            .arena
            .nodes
            .iter()
            .position(|n| n.kind != DescriptorKind::File && n.full_name == full_name)
            .map(|n| self.0.at(n))
    }

    /// Convert the live tree into its plain descriptor-proto form
    pub fn to_proto(&self) -> FileDescriptorProto {
        let meta = self.meta();
        FileDescriptorProto {
            name: Some(self.path().to_string()),
            package: (!meta.package.is_empty()).then(|| meta.package.clone()),
            dependency: meta.dependency.clone(),
            public_dependency: meta.public_dependency.clone(),
            message_type: self.messages().map(|m| Arc::new(m.message_proto())).collect(),
            enum_type: self.enums().map(|e| Arc::new(e.enum_proto())).collect(),
            options: meta.package_path.as_ref().map(|path| FileOptions {
                package_path: Some(path.clone()),
                deprecated: None,
            }),
            syntax: Some(meta.syntax.as_str().to_string()),
        }
    }
}
