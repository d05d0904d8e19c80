//! Index path navigation over decoded file descriptors

use std::sync::Arc;

use crate::descriptorpb::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto};
use crate::error::{DescriptorError, Result};

fn select<'a, T>(list: &'a [Arc<T>], index: usize, level: usize, name: &'static str) -> Result<&'a Arc<T>> {
    list.get(index).ok_or(DescriptorError::IndexOutOfRange {
        level,
        index,
        len: list.len(),
        list: name,
    })
}

/// Follow `path` through top-level then nested messages
fn descend<'a>(file: &'a FileDescriptorProto, path: &[usize]) -> Result<&'a Arc<DescriptorProto>> {
    let (&first, rest) = path.split_first().ok_or(DescriptorError::EmptyPath)?;
    let mut message = select(&file.message_type, first, 0, "message_type")?;
    for (level, &index) in rest.iter().enumerate() {
        message = select(&message.nested_type, index, level + 1, "nested_type")?;
    }
    Ok(message)
}

/// Locate the message declaration addressed by `path`
///
/// The first index selects a top-level message and every further index a
/// nested message of the previous one.
pub fn locate_message(file: &FileDescriptorProto, path: &[usize]) -> Result<Arc<DescriptorProto>> {
    descend(file, path).map(Arc::clone)
}

/// Locate the enum declaration addressed by `path`
///
/// A single index selects a top-level enum. Otherwise the leading indices
/// walk messages as in [`locate_message`] and the last one selects an enum
/// nested in the message reached.
pub fn locate_enum(file: &FileDescriptorProto, path: &[usize]) -> Result<Arc<EnumDescriptorProto>> {
    let (&last, parents) = path.split_last().ok_or(DescriptorError::EmptyPath)?;
    if parents.is_empty() {
        return select(&file.enum_type, last, 0, "enum_type").map(Arc::clone);
    }
    let message = descend(file, parents)?;
    select(&message.enum_type, last, parents.len(), "enum_type").map(Arc::clone)
}
