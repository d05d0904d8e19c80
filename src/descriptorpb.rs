//! Decoded file descriptor tree
//!
//! Plain data mirroring the shape of `google/protobuf/descriptor.proto`.
//! A decoded tree is shared between threads once published by the file
//! cache, so nested declarations sit behind `Arc` and a located message or
//! enum can be handed out without cloning its subtree.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Describes a complete schema file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileDescriptorProto {
    /// File name relative to the import root (e.g. "google/protobuf/any.proto")
    pub name: Option<String>,
    /// Package name (e.g. "google.protobuf")
    pub package: Option<String>,
    /// Names of imported files
    pub dependency: Vec<String>,
    /// Indexes into `dependency` of publicly imported files
    pub public_dependency: Vec<i32>,
    /// Top-level message declarations
    pub message_type: Vec<Arc<DescriptorProto>>,
    /// Top-level enum declarations
    pub enum_type: Vec<Arc<EnumDescriptorProto>>,
    pub options: Option<FileOptions>,
    /// "proto2" or "proto3"
    pub syntax: Option<String>,
}

impl FileDescriptorProto {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn package(&self) -> &str {
        self.package.as_deref().unwrap_or_default()
    }

    pub fn syntax(&self) -> &str {
        self.syntax.as_deref().unwrap_or("proto2")
    }
}

/// File-level options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileOptions {
    /// Package path of the generated code, optionally followed by `;name`
    pub package_path: Option<String>,
    pub deprecated: Option<bool>,
}

/// Describes a message type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DescriptorProto {
    pub name: Option<String>,
    pub field: Vec<FieldDescriptorProto>,
    pub nested_type: Vec<Arc<DescriptorProto>>,
    pub enum_type: Vec<Arc<EnumDescriptorProto>>,
    pub oneof_decl: Vec<OneofDescriptorProto>,
    pub options: Option<MessageOptions>,
}

impl DescriptorProto {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Whether this message is a synthesized map entry
    pub fn is_map_entry(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.map_entry)
            .unwrap_or(false)
    }
}

/// Message-level options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageOptions {
    pub map_entry: Option<bool>,
    pub deprecated: Option<bool>,
}

/// Describes a field within a message
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDescriptorProto {
    pub name: Option<String>,
    pub number: Option<i32>,
    pub label: Option<Label>,
    pub r#type: Option<FieldType>,
    /// Fully qualified type name for message and enum fields (e.g. ".google.protobuf.Value")
    pub type_name: Option<String>,
    /// Index into the containing message's `oneof_decl`
    pub oneof_index: Option<i32>,
    pub json_name: Option<String>,
}

impl FieldDescriptorProto {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Field cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Optional,
    Required,
    Repeated,
}

/// Scalar or composite type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

/// Describes a oneof
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OneofDescriptorProto {
    pub name: Option<String>,
}

/// Describes an enum type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumDescriptorProto {
    pub name: Option<String>,
    pub value: Vec<EnumValueDescriptorProto>,
}

impl EnumDescriptorProto {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Describes a value within an enum
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumValueDescriptorProto {
    pub name: Option<String>,
    pub number: Option<i32>,
}

impl EnumValueDescriptorProto {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}
