// SPDX-License-Identifier: MIT
//! Errors raised while decoding TLV buffers
//!
//! Buffers may come from partially written or corrupted files, so every
//! decode checks its input and fails on the first bad byte.

use crate::asset::TextureUsage;
use crate::format::TlvType;

/// Errors that can occur during reading
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("Truncated header at offset {offset}: {available} bytes available")]
    TruncatedHeader { offset: usize, available: usize },

    #[error("Truncated value at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedValue {
        offset: usize,
        declared: u32,
        available: usize,
    },

    #[error("Unknown tag {tag} at offset {offset}")]
    UnknownTag { offset: usize, tag: u32 },

    #[error("Incorrect type: expected {expected}, got {actual}")]
    TagMismatch { expected: TlvType, actual: TlvType },

    #[error("Incorrect size for {tag}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        tag: TlvType,
        expected: usize,
        actual: usize,
    },

    #[error("Misaligned {tag}: {length} bytes is not a multiple of {element_size}")]
    MisalignedArray {
        tag: TlvType,
        element_size: usize,
        length: usize,
    },

    #[error("Invalid {tag} value: {value}")]
    InvalidEnumValue { tag: TlvType, value: u32 },

    #[error("Invalid UTF-8 in string: {source}")]
    InvalidUtf8 {
        #[from]
        source: std::str::Utf8Error,
    },

    #[error("{composite} is missing field '{field}'")]
    MissingField {
        composite: TlvType,
        field: &'static str,
    },

    #[error("{composite} has trailing data after its last field")]
    TrailingData { composite: TlvType },

    #[error("Texture description cannot have usage {usage}")]
    InvalidTextureUsage { usage: TextureUsage },
}

impl ReadError {
    /// Byte offset of a framing error, relative to the buffer being read
    pub fn offset(&self) -> Option<usize> {
        match self {
            ReadError::TruncatedHeader { offset, .. }
            | ReadError::TruncatedValue { offset, .. }
            | ReadError::UnknownTag { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
