//! Error types for descriptor derivation and decoding

use thiserror::Error;

use crate::reflect::DescriptorKind;

/// Result type for descriptor operations
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// Descriptor errors
///
/// Every variant except the registration, I/O, report and configuration ones is a
/// data-integrity fault: the legacy API surface turns those into panics.
/// A descriptor with no legacy view is never an error, it is `None`.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Failed to compress raw descriptor: {0}")]
    Compress(#[source] std::io::Error),

    #[error("Failed to decompress raw descriptor: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Failed to encode file descriptor: {0}")]
    Encode(String),

    #[error("Failed to decode file descriptor: {0}")]
    Decode(String),

    #[error("Raw descriptor has trailing bytes: decoded {consumed} of {len}")]
    TrailingBytes { consumed: usize, len: usize },

    #[error("Index path is empty")]
    EmptyPath,

    #[error("Index {index} out of range for {list} (len {len}) at path level {level}")]
    IndexOutOfRange {
        level: usize,
        index: usize,
        len: usize,
        list: &'static str,
    },

    #[error("Descriptor {name} is a {actual:?}, expected a {expected:?}")]
    KindMismatch {
        name: String,
        expected: DescriptorKind,
        actual: DescriptorKind,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Unknown output format '{0}' (expected text or json)")]
    UnknownFormat(String),
}

impl DescriptorError {
    /// Whether this error signals corrupt or mismatched descriptor data
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            DescriptorError::Compress(_)
                | DescriptorError::Decompress(_)
                | DescriptorError::Encode(_)
                | DescriptorError::Decode(_)
                | DescriptorError::TrailingBytes { .. }
                | DescriptorError::EmptyPath
                | DescriptorError::IndexOutOfRange { .. }
        )
    }
}
