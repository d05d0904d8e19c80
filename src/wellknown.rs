//! Well-known schema files
//!
//! Reflective descriptors for the `google/protobuf` well-known types, the
//! descriptor schema itself and the compiler plugin protocol. Each file is
//! built once per process so its descriptor identities stay stable and cache
//! entries keyed on them are reused.

use std::sync::OnceLock;

use crate::descriptorpb::{FieldType, Label};
use crate::reflect::{EnumBuilder, FileBuilder, FileDescriptor, MessageBuilder, Syntax};

const PACKAGE: &str = "google.protobuf";

fn well_known(path: &str, package_path: &str) -> FileBuilder {
    FileBuilder::new(format!("google/protobuf/{path}"), PACKAGE)
        .syntax(Syntax::Proto3)
        .package_path(package_path)
}

/// `google/protobuf/descriptor.proto`
///
/// The subset of the descriptor schema that [`crate::descriptorpb`] decodes.
pub fn descriptor() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        let field_types = [
            "TYPE_DOUBLE",
            "TYPE_FLOAT",
            "TYPE_INT64",
            "TYPE_UINT64",
            "TYPE_INT32",
            "TYPE_FIXED64",
            "TYPE_FIXED32",
            "TYPE_BOOL",
            "TYPE_STRING",
            "TYPE_GROUP",
            "TYPE_MESSAGE",
            "TYPE_BYTES",
            "TYPE_UINT32",
            "TYPE_ENUM",
            "TYPE_SFIXED32",
            "TYPE_SFIXED64",
            "TYPE_SINT32",
            "TYPE_SINT64",
        ];
        let type_enum = field_types
            .into_iter()
            .zip(1..)
            .fold(EnumBuilder::new("Type"), |e, (name, number)| e.value(name, number));

        FileBuilder::new("google/protobuf/descriptor.proto", PACKAGE)
            .package_path("protobuf/types/descriptorpb")
            .message(MessageBuilder::new("FileDescriptorSet").typed_field(
                "file",
                1,
                Label::Repeated,
                FieldType::Message,
                ".google.protobuf.FileDescriptorProto",
            ))
            .message(
                MessageBuilder::new("FileDescriptorProto")
                    .field("name", 1, FieldType::String)
                    .field("package", 2, FieldType::String)
                    .repeated("dependency", 3, FieldType::String)
                    .repeated("public_dependency", 10, FieldType::Int32)
                    .typed_field(
                        "message_type",
                        4,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.DescriptorProto",
                    )
                    .typed_field(
                        "enum_type",
                        5,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.EnumDescriptorProto",
                    )
                    .typed_field("options", 8, Label::Optional, FieldType::Message, ".google.protobuf.FileOptions")
                    .field("syntax", 12, FieldType::String),
            )
            .message(
                MessageBuilder::new("DescriptorProto")
                    .field("name", 1, FieldType::String)
                    .typed_field(
                        "field",
                        2,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.FieldDescriptorProto",
                    )
                    .typed_field(
                        "nested_type",
                        3,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.DescriptorProto",
                    )
                    .typed_field(
                        "enum_type",
                        4,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.EnumDescriptorProto",
                    )
                    .typed_field(
                        "options",
                        7,
                        Label::Optional,
                        FieldType::Message,
                        ".google.protobuf.MessageOptions",
                    )
                    .typed_field(
                        "oneof_decl",
                        8,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.OneofDescriptorProto",
                    ),
            )
            .message(
                MessageBuilder::new("FieldDescriptorProto")
                    .field("name", 1, FieldType::String)
                    .field("number", 3, FieldType::Int32)
                    .typed_field(
                        "label",
                        4,
                        Label::Optional,
                        FieldType::Enum,
                        ".google.protobuf.FieldDescriptorProto.Label",
                    )
                    .typed_field(
                        "type",
                        5,
                        Label::Optional,
                        FieldType::Enum,
                        ".google.protobuf.FieldDescriptorProto.Type",
                    )
                    .field("type_name", 6, FieldType::String)
                    .field("oneof_index", 9, FieldType::Int32)
                    .field("json_name", 10, FieldType::String)
                    .enumeration(type_enum)
                    .enumeration(
                        EnumBuilder::new("Label")
                            .value("LABEL_OPTIONAL", 1)
                            .value("LABEL_REQUIRED", 2)
                            .value("LABEL_REPEATED", 3),
                    ),
            )
            .message(MessageBuilder::new("OneofDescriptorProto").field("name", 1, FieldType::String))
            .message(
                MessageBuilder::new("EnumDescriptorProto")
                    .field("name", 1, FieldType::String)
                    .typed_field(
                        "value",
                        2,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.EnumValueDescriptorProto",
                    ),
            )
            .message(
                MessageBuilder::new("EnumValueDescriptorProto")
                    .field("name", 1, FieldType::String)
                    .field("number", 2, FieldType::Int32),
            )
            .message(
                MessageBuilder::new("FileOptions")
                    .field("package_path", 11, FieldType::String)
                    .field("deprecated", 23, FieldType::Bool),
            )
            .message(
                MessageBuilder::new("MessageOptions")
                    .field("deprecated", 3, FieldType::Bool)
                    .field("map_entry", 7, FieldType::Bool),
            )
            .build()
    })
}

/// `google/protobuf/compiler/plugin.proto`
pub fn plugin() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        FileBuilder::new("google/protobuf/compiler/plugin.proto", "google.protobuf.compiler")
            .dependency(descriptor().path())
            .package_path("protobuf/types/pluginpb")
            .message(
                MessageBuilder::new("Version")
                    .field("major", 1, FieldType::Int32)
                    .field("minor", 2, FieldType::Int32)
                    .field("patch", 3, FieldType::Int32)
                    .field("suffix", 4, FieldType::String),
            )
            .message(
                MessageBuilder::new("CodeGeneratorRequest")
                    .repeated("file_to_generate", 1, FieldType::String)
                    .field("parameter", 2, FieldType::String)
                    .typed_field(
                        "proto_file",
                        15,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.FileDescriptorProto",
                    )
                    .typed_field(
                        "compiler_version",
                        3,
                        Label::Optional,
                        FieldType::Message,
                        ".google.protobuf.compiler.Version",
                    ),
            )
            .message(
                MessageBuilder::new("CodeGeneratorResponse")
                    .field("error", 1, FieldType::String)
                    .field("supported_features", 2, FieldType::Uint64)
                    .typed_field(
                        "file",
                        15,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.compiler.CodeGeneratorResponse.File",
                    )
                    .message(
                        MessageBuilder::new("File")
                            .field("name", 1, FieldType::String)
                            .field("insertion_point", 2, FieldType::String)
                            .field("content", 15, FieldType::String),
                    )
                    .enumeration(
                        EnumBuilder::new("Feature")
                            .value("FEATURE_NONE", 0)
                            .value("FEATURE_PROTO3_OPTIONAL", 1),
                    ),
            )
            .build()
    })
}

/// `google/protobuf/any.proto`
pub fn any() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        well_known("any.proto", "protobuf/types/known/anypb")
            .message(
                MessageBuilder::new("Any")
                    .field("type_url", 1, FieldType::String)
                    .field("value", 2, FieldType::Bytes),
            )
            .build()
    })
}

/// `google/protobuf/duration.proto`
pub fn duration() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        well_known("duration.proto", "protobuf/types/known/durationpb")
            .message(
                MessageBuilder::new("Duration")
                    .field("seconds", 1, FieldType::Int64)
                    .field("nanos", 2, FieldType::Int32),
            )
            .build()
    })
}

/// `google/protobuf/timestamp.proto`
pub fn timestamp() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        well_known("timestamp.proto", "protobuf/types/known/timestamppb")
            .message(
                MessageBuilder::new("Timestamp")
                    .field("seconds", 1, FieldType::Int64)
                    .field("nanos", 2, FieldType::Int32),
            )
            .build()
    })
}

/// `google/protobuf/empty.proto`
pub fn empty() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        well_known("empty.proto", "protobuf/types/known/emptypb")
            .message(MessageBuilder::new("Empty"))
            .build()
    })
}

/// `google/protobuf/struct.proto`
pub fn structpb() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        well_known("struct.proto", "protobuf/types/known/structpb")
            .message(
                MessageBuilder::new("Struct")
                    .typed_field(
                        "fields",
                        1,
                        Label::Repeated,
                        FieldType::Message,
                        ".google.protobuf.Struct.FieldsEntry",
                    )
                    .message(
                        MessageBuilder::new("FieldsEntry")
                            .map_entry()
                            .field("key", 1, FieldType::String)
                            .typed_field(
                                "value",
                                2,
                                Label::Optional,
                                FieldType::Message,
                                ".google.protobuf.Value",
                            ),
                    ),
            )
            .message(
                MessageBuilder::new("Value")
                    .oneof_field("kind", "null_value", 1, FieldType::Enum, Some(".google.protobuf.NullValue"))
                    .oneof_field("kind", "number_value", 2, FieldType::Double, None)
                    .oneof_field("kind", "string_value", 3, FieldType::String, None)
                    .oneof_field("kind", "bool_value", 4, FieldType::Bool, None)
                    .oneof_field("kind", "struct_value", 5, FieldType::Message, Some(".google.protobuf.Struct"))
                    .oneof_field("kind", "list_value", 6, FieldType::Message, Some(".google.protobuf.ListValue")),
            )
            .message(MessageBuilder::new("ListValue").typed_field(
                "values",
                1,
                Label::Repeated,
                FieldType::Message,
                ".google.protobuf.Value",
            ))
            .enumeration(EnumBuilder::new("NullValue").value("NULL_VALUE", 0))
            .build()
    })
}

/// `google/protobuf/wrappers.proto`
pub fn wrappers() -> &'static FileDescriptor {
    static FILE: OnceLock<FileDescriptor> = OnceLock::new();
    FILE.get_or_init(|| {
        let wrapped = [
            ("DoubleValue", FieldType::Double),
            ("FloatValue", FieldType::Float),
            ("Int64Value", FieldType::Int64),
            ("UInt64Value", FieldType::Uint64),
            ("Int32Value", FieldType::Int32),
            ("UInt32Value", FieldType::Uint32),
            ("BoolValue", FieldType::Bool),
            ("StringValue", FieldType::String),
            ("BytesValue", FieldType::Bytes),
        ];
        wrapped
            .into_iter()
            .fold(
                well_known("wrappers.proto", "protobuf/types/known/wrapperspb"),
                |file, (name, ty)| file.message(MessageBuilder::new(name).field("value", 1, ty)),
            )
            .build()
    })
}

/// Every file above, in a fixed order
pub fn all() -> [&'static FileDescriptor; 8] {
    [
        descriptor(),
        plugin(),
        any(),
        duration(),
        timestamp(),
        wrappers(),
        structpb(),
        empty(),
    ]
}
