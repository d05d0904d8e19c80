//! Builders for reflective descriptor trees
//!
//! Builders describe declarations in source order; `build` lays them out in
//! a fresh arena, assigning positional indices and identities.

use std::sync::Arc;

use super::{Arena, Descriptor, DescriptorKind, FileDescriptor, FileMeta, Node, Syntax};
use crate::descriptorpb::{EnumValueDescriptorProto, FieldDescriptorProto, FieldType, Label};

/// Builds a [`FileDescriptor`]
#[derive(Debug, Clone)]
pub struct FileBuilder {
    path: String,
    package: String,
    syntax: Syntax,
    dependency: Vec<String>,
    public_dependency: Vec<i32>,
    package_path: Option<String>,
    messages: Vec<MessageBuilder>,
    enums: Vec<EnumBuilder>,
}

impl FileBuilder {
    pub fn new(path: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
            syntax: Syntax::Proto2,
            dependency: Vec::new(),
            public_dependency: Vec::new(),
            package_path: None,
            messages: Vec::new(),
            enums: Vec::new(),
        }
    }

    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn dependency(mut self, path: impl Into<String>) -> Self {
        self.dependency.push(path.into());
        self
    }

    /// Import `path` publicly (re-exporting its declarations)
    pub fn public_dependency(mut self, path: impl Into<String>) -> Self {
        self.public_dependency.push(self.dependency.len() as i32);
        self.dependency.push(path.into());
        self
    }

    pub fn package_path(mut self, package_path: impl Into<String>) -> Self {
        self.package_path = Some(package_path.into());
        self
    }

    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    pub fn enumeration(mut self, enumeration: EnumBuilder) -> Self {
        self.enums.push(enumeration);
        self
    }

    pub fn build(self) -> FileDescriptor {
        let mut nodes = vec![Node::new(
            DescriptorKind::File,
            None,
            0,
            self.path,
            self.package.clone(),
        )];
        let (messages, enums) = push_children(&mut nodes, self.messages, self.enums, 0, &self.package);
        nodes[0].messages = messages;
        nodes[0].enums = enums;

        let arena = Arena {
            nodes,
            file: Some(FileMeta {
                package: self.package,
                syntax: self.syntax,
                dependency: self.dependency,
                public_dependency: self.public_dependency,
                package_path: self.package_path,
            }),
        };
        FileDescriptor(Descriptor {
            arena: Arc::new(arena),
            node: 0,
        })
    }
}

/// Builds a message declaration
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    name: String,
    fields: Vec<FieldDescriptorProto>,
    oneofs: Vec<String>,
    messages: Vec<MessageBuilder>,
    enums: Vec<EnumBuilder>,
    map_entry: bool,
}

impl MessageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            oneofs: Vec::new(),
            messages: Vec::new(),
            enums: Vec::new(),
            map_entry: false,
        }
    }

    /// Add a singular scalar field
    pub fn field(self, name: &str, number: i32, ty: FieldType) -> Self {
        self.push_field(name, number, Label::Optional, ty, None, None)
    }

    /// Add a repeated scalar field
    pub fn repeated(self, name: &str, number: i32, ty: FieldType) -> Self {
        self.push_field(name, number, Label::Repeated, ty, None, None)
    }

    /// Add a message or enum field referring to `type_name`
    pub fn typed_field(
        self,
        name: &str,
        number: i32,
        label: Label,
        ty: FieldType,
        type_name: &str,
    ) -> Self {
        self.push_field(name, number, label, ty, Some(type_name), None)
    }

    /// Add a field belonging to the oneof `oneof`, declaring it on first use
    pub fn oneof_field(
        mut self,
        oneof: &str,
        name: &str,
        number: i32,
        ty: FieldType,
        type_name: Option<&str>,
    ) -> Self {
        let slot = match self.oneofs.iter().position(|o| o == oneof) {
            Some(slot) => slot,
            None => {
                self.oneofs.push(oneof.to_string());
                self.oneofs.len() - 1
            }
        };
        self.push_field(name, number, Label::Optional, ty, type_name, Some(slot as i32))
    }

    /// Mark this message as a synthesized map entry
    pub fn map_entry(mut self) -> Self {
        self.map_entry = true;
        self
    }

    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    pub fn enumeration(mut self, enumeration: EnumBuilder) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// Build this message as the root of its own tree, outside any file
    pub fn build_detached(self) -> Descriptor {
        let mut nodes = Vec::new();
        push_message(&mut nodes, self, None, 0, "");
        Descriptor {
            arena: Arc::new(Arena { nodes, file: None }),
            node: 0,
        }
    }

    fn push_field(
        mut self,
        name: &str,
        number: i32,
        label: Label,
        ty: FieldType,
        type_name: Option<&str>,
        oneof_index: Option<i32>,
    ) -> Self {
        self.fields.push(FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(label),
            r#type: Some(ty),
            type_name: type_name.map(String::from),
            oneof_index,
            json_name: Some(json_name(name)),
        });
        self
    }
}

/// Builds an enum declaration
#[derive(Debug, Clone)]
pub struct EnumBuilder {
    name: String,
    values: Vec<EnumValueDescriptorProto>,
}

impl EnumBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, name: &str, number: i32) -> Self {
        self.values.push(EnumValueDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
        });
        self
    }

    /// Build this enum as the root of its own tree, outside any file
    pub fn build_detached(self) -> Descriptor {
        let mut nodes = Vec::new();
        push_enum(&mut nodes, self, None, 0, "");
        Descriptor {
            arena: Arc::new(Arena { nodes, file: None }),
            node: 0,
        }
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

fn push_children(
    nodes: &mut Vec<Node>,
    messages: Vec<MessageBuilder>,
    enums: Vec<EnumBuilder>,
    parent: usize,
    scope: &str,
) -> (Vec<usize>, Vec<usize>) {
    let messages = messages
        .into_iter()
        .enumerate()
        .map(|(i, m)| push_message(nodes, m, Some(parent), i, scope))
        .collect();
    let enums = enums
        .into_iter()
        .enumerate()
        .map(|(i, e)| push_enum(nodes, e, Some(parent), i, scope))
        .collect();
    (messages, enums)
}

fn push_message(
    nodes: &mut Vec<Node>,
    builder: MessageBuilder,
    parent: Option<usize>,
    index: usize,
    scope: &str,
) -> usize {
    let full_name = qualify(scope, &builder.name);
    let slot = nodes.len();
    let mut node = Node::new(DescriptorKind::Message, parent, index, builder.name, full_name.clone());
    node.fields = builder.fields;
    node.oneofs = builder.oneofs;
    node.map_entry = builder.map_entry;
    nodes.push(node);

    let (messages, enums) = push_children(nodes, builder.messages, builder.enums, slot, &full_name);
    nodes[slot].messages = messages;
    nodes[slot].enums = enums;
    slot
}

fn push_enum(
    nodes: &mut Vec<Node>,
    builder: EnumBuilder,
    parent: Option<usize>,
    index: usize,
    scope: &str,
) -> usize {
    let full_name = qualify(scope, &builder.name);
    let slot = nodes.len();
    let mut node = Node::new(DescriptorKind::Enum, parent, index, builder.name, full_name);
    node.values = builder.values;
    nodes.push(node);
    slot
}

/// lowerCamelCase JSON name of a snake_case field name
fn json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
